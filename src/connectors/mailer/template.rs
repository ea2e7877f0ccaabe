use super::LeadNotice;
use crate::connectors::errors::ConnectorError;
use tera::{Context as TeraContext, Tera};

pub const LEAD_SUBJECT: &str = "Nouveau lead qualifié - WhatsApp AI Assistant";

const LEAD_TEXT_TEMPLATE: &str = r#"Bonjour{% if company_name %} {{ company_name }}{% endif %},

Un nouveau prospect vient d'être qualifié sur WhatsApp.

Contact : {{ contact_name | default(value="Inconnu") }}
Téléphone : {{ contact_phone }}
Statut : {{ prospect_status }}
Dernier message : {{ last_message | default(value="-") }}

Voir la conversation : {{ conversation_url }}
"#;

const LEAD_HTML_TEMPLATE: &str = r#"<h2>Nouveau lead qualifié</h2>
<p>Un nouveau prospect vient d'être qualifié sur WhatsApp.</p>
<ul>
  <li><strong>Contact :</strong> {{ contact_name | default(value="Inconnu") }}</li>
  <li><strong>Téléphone :</strong> {{ contact_phone }}</li>
  <li><strong>Statut :</strong> {{ prospect_status }}</li>
  <li><strong>Dernier message :</strong> {{ last_message | default(value="-") }}</li>
</ul>
<p><a href="{{ conversation_url }}">Voir la conversation</a></p>
"#;

#[derive(Debug, Clone, PartialEq)]
pub struct LeadEmail {
    pub subject: String,
    pub text: String,
    pub html: String,
}

pub struct LeadTemplates {
    tera: Tera,
    frontend_url: String,
}

impl LeadTemplates {
    pub fn new(frontend_url: &str) -> Result<Self, ConnectorError> {
        let mut tera = Tera::default();
        tera.add_raw_template("lead.txt", LEAD_TEXT_TEMPLATE)
            .map_err(|err| ConnectorError::Internal(format!("lead.txt: {err}")))?;
        tera.add_raw_template("lead.html", LEAD_HTML_TEMPLATE)
            .map_err(|err| ConnectorError::Internal(format!("lead.html: {err}")))?;

        Ok(Self {
            tera,
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn render(&self, notice: &LeadNotice) -> Result<LeadEmail, ConnectorError> {
        let mut context = TeraContext::new();
        context.insert("company_name", &notice.company_name);
        context.insert("contact_name", &notice.contact_name);
        context.insert("contact_phone", &notice.contact_phone);
        context.insert("prospect_status", &notice.prospect_status);
        context.insert("last_message", &notice.last_message);
        context.insert(
            "conversation_url",
            &format!("{}/conversations/{}", self.frontend_url, notice.conversation_id),
        );

        let text = self
            .tera
            .render("lead.txt", &context)
            .map_err(|err| ConnectorError::Internal(format!("render lead.txt: {err}")))?;
        let html = self
            .tera
            .render("lead.html", &context)
            .map_err(|err| ConnectorError::Internal(format!("render lead.html: {err}")))?;

        Ok(LeadEmail {
            subject: LEAD_SUBJECT.to_string(),
            text,
            html,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn renders_contact_details_and_link() {
        let id = Uuid::new_v4();
        let templates = LeadTemplates::new("https://app.example.com/").unwrap();
        let email = templates
            .render(&LeadNotice {
                owner_email: "owner@shop.mg".to_string(),
                company_name: Some("Shop".to_string()),
                contact_name: None,
                contact_phone: "+261340000000".to_string(),
                prospect_status: "qualified".to_string(),
                last_message: Some("Je veux un devis".to_string()),
                conversation_id: id,
            })
            .unwrap();

        assert_eq!(email.subject, LEAD_SUBJECT);
        assert!(email.text.contains("Bonjour Shop"));
        assert!(email.text.contains("Contact : Inconnu"));
        assert!(email.text.contains("+261340000000"));
        assert!(email.text.contains("Je veux un devis"));
        let link = format!("https://app.example.com/conversations/{id}");
        assert!(email.text.contains(&link));
        assert!(email.html.contains(&link));
    }
}
