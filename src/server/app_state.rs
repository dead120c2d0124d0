use std::sync::Arc;

use crate::{
    common::{AnyResult, HttpClient},
    configs::Config,
    fetch::{BackoffPolicy, ClientSelector, Sleeper, TokioSleeper},
    relay::MediaRelay,
    sources::{
        Extractor,
        youtube::{
            YouTubeExtractor,
            clients::ClientProfile,
            search::{ApiKeySource, SearchApi, YouTubeDataApi},
        },
    },
};

/// Top-level application state. Built once at boot and never mutated.
pub struct AppState {
    pub config: Config,
    pub extractor: Arc<dyn Extractor>,
    pub search: Arc<dyn SearchApi>,
    pub relay: MediaRelay,
    pub sleeper: Arc<dyn Sleeper>,
    pub policy: BackoffPolicy,
    pub profiles: Vec<ClientProfile>,
    pub fallback_profile: ClientProfile,
}

impl AppState {
    /// Wires the production collaborators described by `config`.
    pub fn from_config(config: Config) -> AnyResult<Self> {
        let api_http = HttpClient::new()?;
        let relay_http =
            HttpClient::new_streaming(config.relay.connect_timeout(), config.relay.read_timeout())?;

        let extractor = Arc::new(YouTubeExtractor::new(api_http.clone()));
        let search = Arc::new(YouTubeDataApi::new(
            api_http,
            config.search.base_url.clone(),
            ApiKeySource::Env(config.search.api_key_env.clone()),
        ));

        Ok(Self::new(
            config,
            extractor,
            search,
            MediaRelay::new(relay_http),
            Arc::new(TokioSleeper),
        ))
    }

    pub fn new(
        config: Config,
        extractor: Arc<dyn Extractor>,
        search: Arc<dyn SearchApi>,
        relay: MediaRelay,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        let profiles = ClientProfile::parse_list(&config.youtube.playback);
        let fallback_profile = config
            .youtube
            .fallback_client
            .parse::<ClientProfile>()
            .unwrap_or_else(|e| {
                tracing::warn!("{}; falling back to {}", e, ClientProfile::Web);
                ClientProfile::Web
            });
        let policy = BackoffPolicy::from_config(&config.fetch.backoff);

        tracing::info!(
            "playback clients: [{}], fallback: {}",
            profiles
                .iter()
                .map(|p| p.name())
                .collect::<Vec<_>>()
                .join(", "),
            fallback_profile
        );

        Self {
            config,
            extractor,
            search,
            relay,
            sleeper,
            policy,
            profiles,
            fallback_profile,
        }
    }

    /// A selector for one request, with its own random source.
    pub fn selector(&self) -> ClientSelector {
        ClientSelector::new(self.extractor.clone(), self.sleeper.clone())
            .with_policy(self.policy.clone())
            .with_fallback_profile(self.fallback_profile)
    }

    pub fn retry_after_secs(&self) -> u64 {
        self.config.relay.retry_after_secs
    }
}
