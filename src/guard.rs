//! Turns the result of a remote call into a [`RequestOutcome`].

use crate::client::ClientError;
use crate::i18n::Translator;
use crate::models::{Envelope, RequestOutcome};

/// Message key for the warning shown when the remote API rejects the token.
pub const SESSION_EXPIRED_KEY: &str = "AuthSessionExpired";

/// Classifies a finished call. The first matching rule wins:
/// failure, expired token, missing data, then success.
///
/// `absent_data_key` lets each call site explain "nothing found" in its own
/// words.
pub fn classify(
    result: Result<Envelope, ClientError>,
    absent_data_key: &str,
    translator: Translator<'_>,
) -> RequestOutcome {
    let envelope = match result {
        Ok(envelope) => envelope,
        Err(e) => return RequestOutcome::AbortWithError(e.to_string()),
    };

    if envelope.is_auth_expired() {
        return RequestOutcome::RedirectLogout {
            warning: translator.translate(SESSION_EXPIRED_KEY),
        };
    }

    match envelope.data {
        None => RequestOutcome::AbortWithWarning(translator.translate(absent_data_key)),
        Some(data) => RequestOutcome::Proceed(data),
    }
}
