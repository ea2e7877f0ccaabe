use crate::models::{Language, Product};
use serde::Serialize;

/// Transactional signals read from one exchange.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Intent {
    pub wants_quote: bool,
    pub wants_product: bool,
    pub mentioned_products: Vec<Product>,
    pub needs_human: bool,
}

impl Intent {
    /// Either signal qualifies the contact as a lead.
    pub fn qualifies_lead(&self) -> bool {
        self.wants_quote || self.wants_product
    }

    /// Compact form stored on the outbound reply.
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "wants_quote": self.wants_quote,
            "wants_product": self.wants_product,
            "needs_human": self.needs_human,
            "mentioned_products": self
                .mentioned_products
                .iter()
                .map(|p| p.id)
                .collect::<Vec<_>>(),
        })
    }
}

/// Replaceable strategy turning an exchange into an [`Intent`].
pub trait IntentClassifier: Send + Sync {
    fn classify(
        &self,
        user_message: &str,
        ai_reply: &str,
        candidates: &[Product],
        language: Language,
    ) -> Intent;
}

struct Keywords {
    quote: &'static [&'static str],
    escalation: &'static [&'static str],
}

const FRENCH: Keywords = Keywords {
    quote: &["devis", "prix", "commande", "acheter", "commander", "tarif"],
    escalation: &["je ne sais pas", "je ne comprends pas", "humain", "personne"],
};

const MALAGASY: Keywords = Keywords {
    quote: &["devis", "vidiny", "mividy", "hividy", "kaomandy", "baiko", "sarany"],
    escalation: &["tsy fantatro", "tsy azoko", "olona"],
};

/// Case-insensitive substring matching over fixed per-language word lists.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    fn keywords(language: Language) -> &'static Keywords {
        match language {
            Language::Fr => &FRENCH,
            Language::Mg => &MALAGASY,
        }
    }
}

fn contains_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|word| text.contains(word))
}

fn mentions(message: &str, field: Option<&str>) -> bool {
    match field.map(str::trim) {
        Some(value) if !value.is_empty() => message.contains(&value.to_lowercase()),
        _ => false,
    }
}

impl IntentClassifier for KeywordClassifier {
    fn classify(
        &self,
        user_message: &str,
        ai_reply: &str,
        candidates: &[Product],
        language: Language,
    ) -> Intent {
        let keywords = Self::keywords(language);
        let message = user_message.to_lowercase();
        let reply = ai_reply.to_lowercase();

        let mentioned_products: Vec<Product> = candidates
            .iter()
            .filter(|p| mentions(&message, Some(&p.title)) || mentions(&message, p.sku.as_deref()))
            .cloned()
            .collect();

        Intent {
            wants_quote: contains_any(&message, keywords.quote)
                || contains_any(&reply, keywords.quote),
            wants_product: !mentioned_products.is_empty(),
            mentioned_products,
            needs_human: contains_any(&reply, keywords.escalation),
        }
    }
}
