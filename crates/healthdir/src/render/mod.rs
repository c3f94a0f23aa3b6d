//! Markup rendering for the facility list.
//!
//! Everything goes through `maud`, so every interpolated field is escaped.
//! The list area has four states, each with its own markup:
//!
//! - loading: shown until the first load resolves
//! - load failure
//! - no results
//! - one card per record

mod card;
mod page;

use std::borrow::Borrow;

use maud::{html, Markup};

use crate::facility::FacilityRecord;

pub use card::CardView;
pub use page::Page;

/// Shown when a search (or an empty dataset) yields nothing.
pub const NO_RESULTS_MESSAGE: &str = "Nenhuma unidade encontrada com os critérios de busca.";

/// Shown when the dataset could not be loaded.
pub const LOAD_ERROR_MESSAGE: &str = "Erro ao conectar com o banco de dados. \
     Verifique sua conexão ou a configuração da fonte de dados.";

/// Shown while the dataset is being loaded.
pub const LOADING_MESSAGE: &str = "Carregando unidades de saúde...";

/// Bootstrap alert flavour for status messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Alert {
    Info,
    Warning,
    Danger,
}

impl Alert {
    fn class(self) -> &'static str {
        match self {
            Self::Info => "alert alert-info text-center",
            Self::Warning => "alert alert-warning text-center",
            Self::Danger => "alert alert-danger text-center",
        }
    }
}

fn alert(kind: Alert, text: &str) -> Markup {
    html! {
        div class="col-12" {
            p class=(kind.class()) { (text) }
        }
    }
}

/// Render a list of records as cards.
///
/// `None` or an empty slice renders the no-results message.
#[must_use]
pub fn render_records<R: Borrow<FacilityRecord>>(records: Option<&[R]>) -> Markup {
    match records {
        Some(records) if !records.is_empty() => html! {
            @for record in records {
                (CardView::from(record.borrow()))
            }
        },
        _ => alert(Alert::Warning, NO_RESULTS_MESSAGE),
    }
}

/// Render the loading state.
#[must_use]
pub fn render_loading() -> Markup {
    alert(Alert::Info, LOADING_MESSAGE)
}

/// Render the load-failure state.
#[must_use]
pub fn render_load_error() -> Markup {
    alert(Alert::Danger, LOAD_ERROR_MESSAGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str) -> FacilityRecord {
        FacilityRecord {
            id: id.to_string(),
            name: name.to_string(),
            ..FacilityRecord::default()
        }
    }

    #[test]
    fn test_render_none_shows_no_results() {
        let html = render_records::<FacilityRecord>(None).into_string();
        assert!(html.contains(NO_RESULTS_MESSAGE));
        assert!(html.contains("alert-warning"));
    }

    #[test]
    fn test_render_empty_shows_no_results() {
        let empty: Vec<&FacilityRecord> = Vec::new();
        let html = render_records(Some(empty.as_slice())).into_string();
        assert!(html.contains(NO_RESULTS_MESSAGE));
    }

    #[test]
    fn test_render_cards_in_order() {
        let records = vec![record("1", "UBS Centro"), record("2", "UPA Norte")];
        let html = render_records(Some(records.as_slice())).into_string();

        let first = html.find("UBS Centro").unwrap();
        let second = html.find("UPA Norte").unwrap();
        assert!(first < second);
        assert_eq!(html.matches("card-title").count(), 2);
        assert!(!html.contains(NO_RESULTS_MESSAGE));
    }

    #[test]
    fn test_render_accepts_borrowed_records() {
        let records = [record("1", "UBS Centro")];
        let borrowed: Vec<&FacilityRecord> = records.iter().collect();
        let html = render_records(Some(borrowed.as_slice())).into_string();
        assert!(html.contains("UBS Centro"));
    }

    #[test]
    fn test_status_messages_are_distinct() {
        let loading = render_loading().into_string();
        let failed = render_load_error().into_string();
        let empty = render_records::<FacilityRecord>(None).into_string();

        assert!(loading.contains(LOADING_MESSAGE));
        assert!(failed.contains("Erro ao conectar com o banco de dados."));
        assert_ne!(loading, empty);
        assert_ne!(failed, empty);
        assert_ne!(loading, failed);
    }
}
