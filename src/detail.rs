//! Detail panel: the selected entity as a titled list of fields plus at most
//! one documentation link.
//!
//! Rendering is a pure function of the payload; the panel keeps no state
//! between selections.

use serde_json::Value;
use url::Url;

use crate::artifacts::value_to_text;
use crate::model::Payload;
use crate::refs::{DocRef, RefResolver};
use crate::search::DocMatch;

pub const PLACEHOLDER: &str = "Select a node, edge, or catalog row.";
pub const DEFAULT_TITLE: &str = "Details";
pub const LINK_LABEL: &str = "Open Docs";

/// A rendered outbound link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocLink {
    pub label: &'static str,
    pub href: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DetailView {
    #[default]
    Placeholder,
    Entity {
        title: String,
        /// `(key, text)` pairs, alphabetical by key.
        fields: Vec<(String, String)>,
        link: Option<DocLink>,
    },
}

impl DetailView {
    pub fn render(payload: Option<&Payload>, refs: &RefResolver, site_base: &Url) -> Self {
        let Some(payload) = payload else {
            return Self::Placeholder;
        };

        let title = ["title", "name", "id"]
            .iter()
            .filter_map(|k| payload.get(*k).and_then(Value::as_str))
            .find(|s| !s.is_empty())
            .unwrap_or(DEFAULT_TITLE)
            .to_string();

        let mut fields: Vec<(String, String)> = payload
            .iter()
            .filter(|(k, _)| k.as_str() != "title")
            .map(|(k, v)| (k.clone(), value_to_text(v)))
            .collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let link = link_for(payload, refs)
            .and_then(|r| r.href(site_base))
            .map(|href| DocLink {
                label: LINK_LABEL,
                href,
            });

        Self::Entity {
            title,
            fields,
            link,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Placeholder => PLACEHOLDER,
            Self::Entity { title, .. } => title,
        }
    }

    pub fn fields(&self) -> &[(String, String)] {
        match self {
            Self::Placeholder => &[],
            Self::Entity { fields, .. } => fields,
        }
    }

    pub fn link(&self) -> Option<&DocLink> {
        match self {
            Self::Placeholder => None,
            Self::Entity { link, .. } => link.as_ref(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }
}

fn link_for(payload: &Payload, refs: &RefResolver) -> Option<DocRef> {
    if let Some(explicit) = payload.get("ref").and_then(Value::as_str).filter(|s| !s.is_empty()) {
        return Some(DocRef::new(explicit));
    }
    ["name", "id"]
        .iter()
        .filter_map(|k| payload.get(*k).and_then(Value::as_str))
        .find_map(|key| refs.resolve(key))
}

/// "Documentation matches" section, replaced wholesale on every search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocMatches {
    matches: Vec<DocMatch>,
}

impl DocMatches {
    pub fn replace(&mut self, matches: Vec<DocMatch>) {
        self.matches = matches;
    }

    pub fn clear(&mut self) {
        self.matches.clear();
    }

    pub fn items(&self) -> &[DocMatch] {
        &self.matches
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn base() -> Url {
        Url::parse("http://localhost:8000/").unwrap()
    }

    fn payload(v: Value) -> Payload {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_placeholder() {
        let view = DetailView::render(None, &RefResolver::default(), &base());
        assert!(view.is_placeholder());
        assert_eq!(view.title(), PLACEHOLDER);
        assert!(view.fields().is_empty());
    }

    #[test]
    fn test_title_precedence() {
        let r = RefResolver::default();
        let view = DetailView::render(Some(&payload(json!({"title": "", "name": "n", "id": "i"}))), &r, &base());
        assert_eq!(view.title(), "n");
        let view = DetailView::render(Some(&payload(json!({"id": "i"}))), &r, &base());
        assert_eq!(view.title(), "i");
        let view = DetailView::render(Some(&payload(json!({"count": 3}))), &r, &base());
        assert_eq!(view.title(), DEFAULT_TITLE);
    }

    #[test]
    fn test_fields_sorted_and_stringified() {
        let p = payload(json!({"title": "t", "zeta": null, "alpha": [1, 2], "mid": "x"}));
        let view = DetailView::render(Some(&p), &RefResolver::default(), &base());
        assert_eq!(
            view.fields(),
            &[
                ("alpha".to_string(), "[1,2]".to_string()),
                ("mid".to_string(), "x".to_string()),
                ("zeta".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_link_from_ref_or_lookup() {
        let refs = RefResolver::new(HashMap::from([(
            "ingestion".to_string(),
            "codebase_map_pack/packages/#ingestion".to_string(),
        )]));
        let p = payload(json!({"name": "x", "ref": "codebase_map_pack/contracts/"}));
        let view = DetailView::render(Some(&p), &refs, &base());
        assert_eq!(
            view.link().unwrap().href,
            "http://localhost:8000/codebase_map_pack/contracts/"
        );

        let p = payload(json!({"name": "ingestion", "ref": null}));
        let view = DetailView::render(Some(&p), &refs, &base());
        assert_eq!(view.link().unwrap().label, LINK_LABEL);
        assert!(view.link().unwrap().href.ends_with("#ingestion"));

        let p = payload(json!({"name": "unknown", "ref": null}));
        assert!(DetailView::render(Some(&p), &refs, &base()).link().is_none());
    }

    #[test]
    fn test_doc_matches_replaced_wholesale() {
        let mut section = DocMatches::default();
        section.replace(vec![DocMatch { title: "a".into(), href: None }]);
        section.replace(vec![DocMatch { title: "b".into(), href: None }]);
        assert_eq!(section.items().len(), 1);
        assert_eq!(section.items()[0].title, "b");
        section.clear();
        assert!(section.is_empty());
    }
}
