//! Visible-text extraction and tokenization
//!
//! Word statistics only count text a reader would see: markup inside
//! style/script/head regions and comments is excluded.

use crate::extract::stopwords::is_stop_word;
use ego_tree::NodeRef;
use scraper::{Html, Node};
use std::collections::HashMap;

/// Element names whose subtrees carry no visible text
const HIDDEN_ELEMENTS: &[&str] = &["head", "meta", "noscript", "script", "style", "title"];

/// Collects the visible text of a parsed document
pub fn visible_text(document: &Html) -> String {
    let mut out = String::new();
    collect_visible(document.tree.root(), &mut out);
    out
}

fn collect_visible(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Element(element) => {
            if HIDDEN_ELEMENTS.contains(&element.name()) {
                return;
            }
            for child in node.children() {
                collect_visible(child, out);
            }
        }
        Node::Text(text) => {
            let trimmed = text.text.trim();
            if !trimmed.is_empty() {
                out.push_str(trimmed);
                out.push(' ');
            }
        }
        // Comments, doctypes and processing instructions are never visible
        Node::Comment(_) | Node::Doctype(_) | Node::ProcessingInstruction(_) => {}
        _ => {
            for child in node.children() {
                collect_visible(child, out);
            }
        }
    }
}

/// Splits text into lowercase alphanumeric tokens
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            current.push(ch.to_ascii_lowercase());
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

/// Computes word frequencies over a token list, skipping stop words
pub fn word_frequencies(tokens: &[String]) -> HashMap<String, u64> {
    let mut freqs = HashMap::new();
    for token in tokens {
        if !is_stop_word(token) {
            *freqs.entry(token.clone()).or_insert(0) += 1;
        }
    }
    freqs
}
