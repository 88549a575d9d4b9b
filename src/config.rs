use serde::Deserialize;

use crate::error::{Error, Result};
use crate::structs::StreamSpec;

#[derive(Deserialize, Debug, Clone)]
struct Profile {
    experiments: Vec<StreamSpec>,
}

/// Parse a TOML experiment profile listing the streams to generate.
///
/// ```toml
/// [[experiments]]
/// packet_size = 512
/// packet_count = 20_000
/// consumer_count = 2
/// ```
pub fn import_experiments(config: &str) -> Result<Vec<StreamSpec>> {
    let profile: Profile = toml::from_str(config).map_err(|e| Error::InvalidParameter {
        name: "profile",
        reason: e.to_string(),
    })?;
    if profile.experiments.is_empty() {
        return Err(Error::InvalidParameter {
            name: "profile",
            reason: "no experiments defined".to_string(),
        });
    }
    log::info!("{} experiments loaded", profile.experiments.len());
    Ok(profile.experiments)
}

/// The embedded default grid: vary packet count, packet size and consumer
/// count around a 512 B / 100 000-packet / 2-consumer baseline.
pub fn default_experiments() -> Vec<StreamSpec> {
    import_experiments(include_str!("../default_profiles/experiments.toml"))
        .expect("the embedded default profile is valid")
}
