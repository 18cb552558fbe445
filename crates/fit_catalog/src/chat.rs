use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static SHOWINFO_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<url=showinfo:(\d+)//(\d+)>([^<]+)</url>").expect("valid showinfo pattern")
});

/// An item link pasted from in-game chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatLink {
    pub type_id: u64,
    pub item_id: String,
    pub name: String,
}

/// Extracts `<url=showinfo:TYPE//ITEM>NAME</url>` links in text order,
/// keeping the first link per item id.
pub fn parse_chat_links(text: &str) -> Vec<ChatLink> {
    let mut seen = HashSet::new();
    SHOWINFO_LINK_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let type_id = caps[1].parse().ok()?;
            let item_id = caps[2].to_string();
            Some(ChatLink {
                type_id,
                item_id,
                name: caps[3].trim().to_string(),
            })
        })
        .filter(|link| seen.insert(link.item_id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_links_in_order() {
        let text = "<url=showinfo:47745//1040000001>Abyssal Damage Amplifier</url> and \
                    <URL=showinfo:47408//1040000002> Abyssal Afterburner </URL>";
        let links = parse_chat_links(text);
        assert_eq!(
            links,
            vec![
                ChatLink {
                    type_id: 47_745,
                    item_id: "1040000001".to_string(),
                    name: "Abyssal Damage Amplifier".to_string(),
                },
                ChatLink {
                    type_id: 47_408,
                    item_id: "1040000002".to_string(),
                    name: "Abyssal Afterburner".to_string(),
                },
            ]
        );
    }

    #[test]
    fn repeated_item_is_listed_once() {
        let link = "<url=showinfo:47745//1040000001>Amp</url>";
        assert_eq!(parse_chat_links(&format!("{link} {link}")).len(), 1);
    }

    #[test]
    fn plain_text_has_no_links() {
        assert!(parse_chat_links("wts abyssal amps, convo me").is_empty());
        assert!(parse_chat_links("<url=showinfo:abc//1>broken</url>").is_empty());
    }
}
