// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Notification emails for accepted submissions, in English and Spanish.

use crate::submission::{FormKind, FormSubmission};
use chrono::{DateTime, Utc};
use std::fmt::Write as _;

/// Supported notification languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    En,
    Es,
}

impl Locale {
    /// Parse a locale tag; anything other than Spanish falls back to English.
    pub fn parse(tag: &str) -> Self {
        let primary = tag.split(['-', '_']).next().unwrap_or("").trim();
        if primary.eq_ignore_ascii_case("es") {
            Self::Es
        } else {
            Self::En
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
        }
    }

    /// Confirmation shown to the submitter after delivery.
    pub fn confirmation(self) -> &'static str {
        match self {
            Self::En => "Your message has been sent successfully. We will get back to you soon.",
            Self::Es => "Su mensaje ha sido enviado exitosamente. Nos pondremos en contacto pronto.",
        }
    }
}

/// A rendered notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub text: String,
    pub html: String,
}

struct Labels {
    contact_heading: &'static str,
    contact_subject: &'static str,
    inquiry_heading: &'static str,
    inquiry_subject: &'static str,
    contact_section: &'static str,
    message_section: &'static str,
    name: &'static str,
    email: &'static str,
    company: &'static str,
    country: &'static str,
    phone: &'static str,
    subject: &'static str,
    product: &'static str,
    sent_on: &'static str,
    respond: &'static str,
}

const EN: Labels = Labels {
    contact_heading: "New Contact Form Submission",
    contact_subject: "New Contact Form",
    inquiry_heading: "New Product Inquiry",
    inquiry_subject: "New Product Inquiry",
    contact_section: "Contact Information",
    message_section: "Message Content",
    name: "Name",
    email: "Email",
    company: "Company",
    country: "Country",
    phone: "Phone",
    subject: "Subject",
    product: "Product Interest",
    sent_on: "Sent on",
    respond: "Please respond within 24 hours.",
};

const ES: Labels = Labels {
    contact_heading: "Nueva Consulta de Contacto",
    contact_subject: "Nueva Consulta",
    inquiry_heading: "Nueva Consulta de Producto",
    inquiry_subject: "Nueva Consulta de Producto",
    contact_section: "Información de Contacto",
    message_section: "Contenido del Mensaje",
    name: "Nombre",
    email: "Correo Electrónico",
    company: "Empresa",
    country: "País",
    phone: "Teléfono",
    subject: "Asunto",
    product: "Producto de Interés",
    sent_on: "Enviado el",
    respond: "Por favor responda dentro de 24 horas.",
};

fn labels(locale: Locale) -> &'static Labels {
    match locale {
        Locale::En => &EN,
        Locale::Es => &ES,
    }
}

/// Display name for a contact-form subject slug.
fn contact_topic(slug: &str, locale: Locale) -> Option<&'static str> {
    let (en, es) = match slug {
        "product-inquiry" => ("Product Inquiry", "Consulta de Producto"),
        "technical-support" => ("Technical Support Request", "Solicitud de Soporte Técnico"),
        "partnership" => ("Partnership Inquiry", "Consulta de Asociación"),
        "custom-solution" => ("Custom Solution Request", "Solicitud de Solución Personalizada"),
        "other" => ("General Inquiry", "Consulta General"),
        _ => return None,
    };
    Some(match locale {
        Locale::En => en,
        Locale::Es => es,
    })
}

fn product_name(product: &str, locale: Locale) -> Option<&'static str> {
    if locale == Locale::En {
        return None;
    }
    match product {
        "Flexible Busbar" => Some("Barra Flexible"),
        "Busbar Connector" => Some("Conector de Barra"),
        "Custom Solutions" => Some("Soluciones Personalizadas"),
        "Other" => Some("Otro"),
        _ => None,
    }
}

/// Render the notification for an accepted submission.
pub fn render(
    kind: FormKind,
    payload: &FormSubmission,
    locale: Locale,
    sent_at: DateTime<Utc>,
) -> RenderedEmail {
    let l = labels(locale);
    let field = |name: &str| payload.trimmed(name).unwrap_or("");
    let company = field("company");

    let (heading, subject, rows) = match kind {
        FormKind::Contact => {
            let raw = field("subject");
            let topic = contact_topic(raw, locale).unwrap_or(raw);
            let mut subject = l.contact_subject.to_string();
            for part in [topic, company] {
                if !part.is_empty() {
                    subject.push_str(" - ");
                    subject.push_str(part);
                }
            }
            let rows = vec![
                (l.name, field("name")),
                (l.email, field("email")),
                (l.company, company),
                (l.country, field("country")),
                (l.phone, field("phone")),
                (l.subject, topic),
            ];
            (l.contact_heading, subject, rows)
        }
        FormKind::Inquiry => {
            let raw = field("productInterest");
            let product = product_name(raw, locale).unwrap_or(raw);
            let mut subject = format!("{} - {}", l.inquiry_subject, company);
            if !product.is_empty() {
                subject.push_str(" - ");
                subject.push_str(product);
            }
            let rows = vec![
                (l.name, field("name")),
                (l.email, field("email")),
                (l.company, company),
                (l.phone, field("phone")),
                (l.product, product),
            ];
            (l.inquiry_heading, subject, rows)
        }
    };

    let message = field("message");
    let date = sent_at.format("%Y-%m-%d %H:%M UTC").to_string();
    let rows: Vec<(&str, &str)> = rows.into_iter().filter(|(_, v)| !v.is_empty()).collect();

    let mut text = String::new();
    let _ = writeln!(text, "{}\n", heading.to_uppercase());
    let _ = writeln!(text, "{}:", l.contact_section.to_uppercase());
    for (label, value) in &rows {
        let _ = writeln!(text, "{}: {}", label, value);
    }
    let _ = writeln!(text, "\n{}:\n{}\n", l.message_section.to_uppercase(), message);
    let _ = writeln!(text, "{}: {}", l.sent_on, date);
    let _ = write!(text, "{}", l.respond);

    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html><html lang=\"{}\"><head><meta charset=\"utf-8\"><title>{}</title></head><body>",
        locale.as_str(),
        escape_html(&subject)
    );
    let _ = write!(html, "<h1>{}</h1><h2>{}</h2><table>", heading, l.contact_section);
    for (label, value) in &rows {
        let _ = write!(html, "<tr><td>{}</td><td>{}</td></tr>", label, escape_html(value));
    }
    let _ = write!(
        html,
        "</table><h2>{}</h2><p>{}</p><p>{}: {}</p><p>{}</p></body></html>",
        l.message_section,
        escape_html(message).replace('\n', "<br>"),
        l.sent_on,
        date,
        l.respond
    );

    RenderedEmail {
        subject,
        text,
        html,
    }
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
