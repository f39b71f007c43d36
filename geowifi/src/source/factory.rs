//! Source construction and enum dispatch.
//!
//! [`AnySource`] wraps every concrete adapter so the dispatcher can hold a
//! homogeneous collection without boxing futures. [`SourceRegistry`] builds
//! one of each from a shared HTTP client and the run's [`Settings`].

use std::collections::BTreeMap;

use super::apple::AppleSource;
use super::combain::CombainSource;
use super::freifunk::FreifunkSource;
use super::google::GoogleSource;
use super::http::{AsyncHttpClient, AsyncReqwestClient};
use super::mylnikov::MylnikovSource;
use super::openwifimap::OpenWifiMapSource;
use super::types::{Source, SourceError, SourceId, SourceOutcome};
use super::vendor::MacVendorSource;
use super::wifidb::WifiDbSource;
use super::wigle::WigleSource;
use crate::config::Settings;
use crate::record::LookupKey;

/// Enum wrapper over every adapter for static dispatch.
pub enum AnySource<C: AsyncHttpClient> {
    Wigle(WigleSource<C>),
    Apple(AppleSource<C>),
    Mylnikov(MylnikovSource<C>),
    Google(GoogleSource<C>),
    Combain(CombainSource<C>),
    WifiDb(WifiDbSource<C>),
    OpenWifiMap(OpenWifiMapSource<C>),
    Freifunk(FreifunkSource<C>),
    MacVendors(MacVendorSource<C>),
}

impl<C: AsyncHttpClient> AnySource<C> {
    /// Creates the adapter for `id`, taking credentials from `settings`.
    pub fn create(id: SourceId, http_client: C, settings: &Settings) -> Self {
        match id {
            SourceId::Wigle => Self::Wigle(WigleSource::new(
                http_client,
                settings.wigle_auth().map(str::to_string),
            )),
            SourceId::Apple => Self::Apple(AppleSource::new(http_client)),
            SourceId::Mylnikov => Self::Mylnikov(MylnikovSource::new(http_client)),
            SourceId::Google => Self::Google(GoogleSource::new(
                http_client,
                settings.google_api().map(str::to_string),
            )),
            SourceId::Combain => Self::Combain(CombainSource::new(
                http_client,
                settings.combain_api().map(str::to_string),
            )),
            SourceId::WifiDb => Self::WifiDb(WifiDbSource::new(http_client)),
            SourceId::OpenWifiMap => Self::OpenWifiMap(OpenWifiMapSource::new(http_client)),
            SourceId::Freifunk => Self::Freifunk(FreifunkSource::new(http_client)),
            SourceId::MacVendors => Self::MacVendors(MacVendorSource::new(http_client)),
        }
    }
}

impl<C: AsyncHttpClient> Source for AnySource<C> {
    fn id(&self) -> SourceId {
        match self {
            Self::Wigle(s) => s.id(),
            Self::Apple(s) => s.id(),
            Self::Mylnikov(s) => s.id(),
            Self::Google(s) => s.id(),
            Self::Combain(s) => s.id(),
            Self::WifiDb(s) => s.id(),
            Self::OpenWifiMap(s) => s.id(),
            Self::Freifunk(s) => s.id(),
            Self::MacVendors(s) => s.id(),
        }
    }

    async fn lookup(&self, key: &LookupKey) -> SourceOutcome {
        match self {
            Self::Wigle(s) => s.lookup(key).await,
            Self::Apple(s) => s.lookup(key).await,
            Self::Mylnikov(s) => s.lookup(key).await,
            Self::Google(s) => s.lookup(key).await,
            Self::Combain(s) => s.lookup(key).await,
            Self::WifiDb(s) => s.lookup(key).await,
            Self::OpenWifiMap(s) => s.lookup(key).await,
            Self::Freifunk(s) => s.lookup(key).await,
            Self::MacVendors(s) => s.lookup(key).await,
        }
    }
}

/// Every available source, keyed by identity.
pub struct SourceRegistry<S> {
    sources: BTreeMap<SourceId, S>,
}

impl SourceRegistry<AnySource<AsyncReqwestClient>> {
    /// Builds all sources over one reqwest client configured from `settings`.
    pub fn from_config(settings: &Settings) -> Result<Self, SourceError> {
        let http_client =
            AsyncReqwestClient::with_options(settings.timeout_secs(), settings.verify_tls())?;
        Ok(Self::with_client(http_client, settings))
    }
}

impl<C: AsyncHttpClient + Clone> SourceRegistry<AnySource<C>> {
    /// Builds all sources sharing clones of `http_client`.
    pub fn with_client(http_client: C, settings: &Settings) -> Self {
        let sources = SourceId::ALL
            .into_iter()
            .map(|id| (id, AnySource::create(id, http_client.clone(), settings)))
            .collect();
        Self { sources }
    }
}

impl<S: Source> SourceRegistry<S> {
    pub fn new() -> Self {
        Self {
            sources: BTreeMap::new(),
        }
    }

    /// Registers a source under its own identity, replacing any previous one.
    pub fn register(&mut self, source: S) {
        self.sources.insert(source.id(), source);
    }

    pub fn get(&self, id: SourceId) -> Option<&S> {
        self.sources.get(&id)
    }

    pub fn into_sources(self) -> BTreeMap<SourceId, S> {
        self.sources
    }
}

impl<S: Source> Default for SourceRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}
