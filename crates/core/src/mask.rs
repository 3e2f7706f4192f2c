//! Read-time secret masking.
//!
//! Message text is stored exactly as the assistant logged it and masked only
//! on the way out, so widening the rule set later also covers old imports.
//!
//! Every replacement keeps the non-secret prefix (`sk-`, `API_KEY=`, the URL
//! scheme, ...) and substitutes `***`. Value patterns refuse to start on `*`,
//! which keeps each rule from matching its own output and makes
//! [`mask_secrets`] idempotent.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;
use tracing::trace;

struct MaskRule {
    name: &'static str,
    pattern: Regex,
    replacement: &'static str,
    /// Leaves a match untouched when it returns true.
    keep: Option<fn(&Captures) -> bool>,
}

fn rule(name: &'static str, pattern: &str, replacement: &'static str) -> MaskRule {
    MaskRule {
        name,
        pattern: Regex::new(pattern).unwrap(),
        replacement,
        keep: None,
    }
}

impl MaskRule {
    fn keep_if(mut self, keep: fn(&Captures) -> bool) -> Self {
        self.keep = Some(keep);
        self
    }

    fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        if !self.pattern.is_match(text) {
            return Cow::Borrowed(text);
        }
        trace!("mask rule {} matched", self.name);
        self.pattern.replace_all(text, |caps: &Captures| {
            if self.keep.is_some_and(|keep| keep(caps)) {
                return caps[0].to_string();
            }
            let mut dst = String::new();
            caps.expand(self.replacement, &mut dst);
            dst
        })
    }
}

const AUTH_SCHEMES: &[&str] = &["basic", "bearer", "token", "digest", "negotiate"];

/// A bare scheme word after `Authorization:` is not a credential. This is
/// what a second pass sees once the value behind the scheme became `***`.
fn is_auth_scheme(caps: &Captures) -> bool {
    caps.get(3)
        .is_some_and(|v| AUTH_SCHEMES.iter().any(|s| v.as_str().eq_ignore_ascii_case(s)))
}

/// Ordered rule table. Block-shaped secrets go first so the line-oriented
/// rules never see half a PEM body.
static RULES: LazyLock<Vec<MaskRule>> = LazyLock::new(|| {
    vec![
        rule(
            "pem-private-key",
            r"(?s)-----BEGIN [A-Z0-9 ]*PRIVATE KEY-----.*?-----END [A-Z0-9 ]*PRIVATE KEY-----",
            "[REDACTED PRIVATE KEY]",
        ),
        rule(
            "ssh-public-key",
            r"\b(ssh-(?:rsa|ed25519|dss)|ecdsa-sha2-nistp[0-9]+) AAAA[A-Za-z0-9+/]+=*",
            "${1} [REDACTED]",
        ),
        rule(
            "openai-anthropic-key",
            r"\bsk-(?:ant-|proj-)?[A-Za-z0-9_\-]{20,}",
            "sk-***",
        ),
        rule(
            "github-token",
            r"\b(gh[pousr])_[A-Za-z0-9]{20,}",
            "${1}_***",
        ),
        rule(
            "github-fine-grained-token",
            r"\bgithub_pat_[A-Za-z0-9_]{20,}",
            "github_pat_***",
        ),
        rule("aws-access-key-id", r"\bAKIA[0-9A-Z]{16}\b", "AKIA***"),
        rule(
            "slack-token",
            r"\b(xox[abprs])-[A-Za-z0-9\-]{10,}",
            "${1}-***",
        ),
        rule("google-api-key", r"\bAIza[0-9A-Za-z_\-]{35}", "AIza***"),
        rule(
            "bearer-token",
            r"(?i)\b(bearer)\s+[A-Za-z0-9\-._~+/]{8,}=*",
            "${1} ***",
        ),
        rule(
            "authorization-header",
            r"(?i)\b(authorization\s*:\s*)((?:basic|token|digest|negotiate)\s+)?([^\s*][A-Za-z0-9\-._~+/]{7,}=*)",
            "${1}${2}***",
        )
        .keep_if(is_auth_scheme),
        rule(
            "connection-string-credentials",
            r"\b([a-zA-Z][a-zA-Z0-9+.\-]*://)([^\s:/@]+):[^\s@/*][^\s@/]*@",
            "${1}${2}:***@",
        ),
        rule(
            "env-assignment",
            r#"\b([A-Z][A-Z0-9_]*_(?:KEY|SECRET|TOKEN|PASSWORD|PASS|PWD))\s*=\s*(["']?)[^\s"'*][^\s"']*"#,
            "${1}=${2}***",
        ),
        rule(
            "config-key-value",
            r#"(?i)\b((?:[a-z0-9]+[_-])*(?:password|passwd|pwd|secret|token|api[_-]?key|access[_-]?key|client[_-]?secret|auth[_-]?token))(["']?\s*[:=]\s*["']?)[^\s"'*,;}\]][^\s"',;}\]]*"#,
            "${1}${2}***",
        ),
    ]
});

/// Mask every credential-looking substring in `text`.
pub fn mask_secrets(text: &str) -> String {
    let mut out = Cow::Borrowed(text);
    for rule in RULES.iter() {
        if let Cow::Owned(replaced) = rule.apply(&out) {
            out = Cow::Owned(replaced);
        }
    }
    out.into_owned()
}

/// `None` and empty strings pass through untouched.
pub fn mask_opt(text: Option<&str>) -> Option<String> {
    match text {
        None => None,
        Some("") => Some(String::new()),
        Some(t) => Some(mask_secrets(t)),
    }
}
