use crate::config::{client_secret_var, ConfigError};
use crate::models::ClientRegistration;
use crate::repositories::{InMemoryClientDirectory, UpsertOutcome};
use common::secret::ExposeSecret;
use tracing::info;

/// Counts from one seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub created: usize,
    pub updated: usize,
}

/// Create or update each configured client in the directory.
///
/// Running it again with the same registrations updates in place and never
/// duplicates a client. All registrations are checked before the first write,
/// so a bad entry leaves the directory untouched.
///
/// # Errors
///
/// `MissingClientSecret` if a confidential client has no (or a blank) secret.
pub async fn seed_clients(
    directory: &InMemoryClientDirectory,
    registrations: &[ClientRegistration],
) -> Result<SeedReport, ConfigError> {
    for registration in registrations {
        let has_secret = registration
            .secret
            .as_ref()
            .is_some_and(|s| !s.expose_secret().trim().is_empty());

        if registration.client.requires_secret() && !has_secret {
            return Err(ConfigError::MissingClientSecret {
                client_id: registration.client.client_id.to_string(),
                var: client_secret_var(registration.client.client_id.as_str()),
            });
        }
    }

    let mut report = SeedReport::default();

    for registration in registrations {
        let outcome = directory.upsert(registration.client.clone()).await;

        match outcome {
            UpsertOutcome::Created => report.created += 1,
            UpsertOutcome::Updated => report.updated += 1,
        }

        info!(
            target: "as.repositories.clients",
            client_id = %registration.client.client_id,
            client_type = registration.client.client_type.as_str(),
            post_logout_uris = registration.client.post_logout_redirect_uris.len(),
            outcome = outcome.as_str(),
            "Seeded client"
        );
    }

    Ok(report)
}
