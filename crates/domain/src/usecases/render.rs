//! Digest email rendering

use std::collections::BTreeMap;

use crate::model::{Digest, User};
use crate::ports::OutgoingEmail;

pub const DIGEST_SUBJECT: &str = "Your Daily Personalized News Digest";

/// Render a digest into the outbound email for its user
///
/// Articles are grouped by category, categories in alphabetical order,
/// articles within a category in digest (window) order. The AI overview is
/// included when present.
pub fn render_digest_email(user: &User, digest: &Digest) -> OutgoingEmail {
    let mut by_category: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for article in &digest.articles {
        by_category
            .entry(article.category.as_str())
            .or_default()
            .push(article.title.as_str());
    }

    let mut body = format!("Hi {},\nHere is your news digest for today:\n\n", user.name);

    for (category, titles) in &by_category {
        body.push_str(&format!("🔹 {category}\n"));
        for title in titles {
            body.push_str(&format!("- {title}\n"));
        }
        body.push('\n');
    }

    if let Some(summary) = &digest.summary_text {
        body.push_str("Today's overview:\n");
        body.push_str(summary);
        body.push_str("\n\n");
    }

    body.push_str("Stay informed!\n— News Digest AI");

    OutgoingEmail {
        to: user.email.clone(),
        subject: DIGEST_SUBJECT.to_string(),
        body,
    }
}
