//! Full page document wrapping the facility list.

use maud::{html, Markup, Render, DOCTYPE};

use crate::feedback::FeedbackForm;

const BOOTSTRAP_CSS: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css";
const BOOTSTRAP_ICONS: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap-icons@1.11.3/font/bootstrap-icons.min.css";

/// The page around the list area: header, search box, list, feedback form.
#[derive(Debug, Clone)]
pub struct Page<'a> {
    /// Document title and heading.
    pub title: &'a str,
    /// Current contents of the search box.
    pub term: &'a str,
    /// Rendered list area.
    pub list: &'a Markup,
    /// Feedback form state.
    pub feedback: &'a FeedbackForm,
}

impl Render for Page<'_> {
    fn render(&self) -> Markup {
        let first = self.feedback.first_name();
        let last = self.feedback.last_name();
        html! {
            (DOCTYPE)
            html lang="pt-BR" {
                head {
                    meta charset="utf-8";
                    meta name="viewport" content="width=device-width, initial-scale=1";
                    title { (self.title) }
                    link rel="stylesheet" href=(BOOTSTRAP_CSS);
                    link rel="stylesheet" href=(BOOTSTRAP_ICONS);
                }
                body {
                    main class="container py-4" {
                        h1 class="mb-4" { (self.title) }
                        input id="inputBusca" class="form-control mb-4" type="search"
                            placeholder="Buscar por nome, bairro ou serviço" value=(self.term);
                        div id="unidadesLista" class="row row-cols-1 row-cols-md-2 g-4" {
                            (self.list)
                        }
                        hr class="my-5";
                        h2 { "Deixe seu feedback" }
                        form id="formFeedback" {
                            div class="form-check mb-3" {
                                input id="anonimoCheck" class="form-check-input" type="checkbox"
                                    checked[self.feedback.is_anonymous()];
                                label class="form-check-label" for="anonimoCheck" { "Enviar anonimamente" }
                            }
                            div class="row g-3 mb-3" {
                                div class="col" {
                                    input id="nome" class="form-control" type="text" placeholder="Nome"
                                        value=(first.value()) disabled[!first.is_enabled()];
                                }
                                div class="col" {
                                    input id="sobrenome" class="form-control" type="text" placeholder="Sobrenome"
                                        value=(last.value()) disabled[!last.is_enabled()];
                                }
                            }
                            textarea id="mensagem" class="form-control mb-3" rows="4" { (self.feedback.message) }
                            button class="btn btn-primary" type="submit" { "Enviar" }
                        }
                    }
                }
            }
        }
    }
}
