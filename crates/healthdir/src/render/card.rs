//! The card for a single facility.

use maud::{html, Markup, Render};

use crate::facility::FacilityRecord;

/// View-model for one facility card, with fallbacks already applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView<'a> {
    /// Card title.
    pub title: &'a str,
    /// "{unit type} - {neighborhood}".
    pub subtitle: String,
    /// Address line.
    pub address: &'a str,
    /// Opening hours line.
    pub hours: &'a str,
    /// Contact line.
    pub phone: &'a str,
    /// One tag per service.
    pub services: &'a [String],
}

impl<'a> From<&'a FacilityRecord> for CardView<'a> {
    fn from(record: &'a FacilityRecord) -> Self {
        Self {
            title: &record.name,
            subtitle: format!("{} - {}", record.unit_type(), record.neighborhood()),
            address: record.address_or_fallback(),
            hours: record.opening_hours_or_fallback(),
            phone: record.phone_or_fallback(),
            services: &record.services,
        }
    }
}

impl Render for CardView<'_> {
    fn render(&self) -> Markup {
        html! {
            div class="col" {
                div class="card unidade-card shadow-sm" {
                    div class="card-body" {
                        h5 class="card-title" { (self.title) }
                        p class="card-text text-muted mb-1" { (self.subtitle) }
                        p class="card-text" {
                            i class="bi bi-geo-alt-fill me-1" {}
                            " Endereço: " (self.address)
                        }
                        p class="card-text" {
                            i class="bi bi-clock me-1" {}
                            " Horário: " (self.hours)
                        }
                        p class="card-text" {
                            i class="bi bi-telephone me-1" {}
                            " Contato: " (self.phone)
                        }
                        hr;
                        h6 { "Serviços Oferecidos:" }
                        div class="d-flex flex-wrap" {
                            @for service in self.services {
                                span class="badge bg-secondary badge-servico" { (service) }
                            }
                        }
                    }
                }
            }
        }
    }
}
