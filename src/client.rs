use crate::error::{BraviaError, Result};
use crate::protocol::{service, RpcRequest};
use crate::transport::Transport;
use crate::types::{
    App, ContentItem, InputSource, PlayingInfo, PowerStatus, RemoteCommand, SystemInfo, VolumeInfo,
};
use crate::wol::{self, MacAddr};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// IRCC code used for power-on when the code table has no `TvPower` entry
const DEFAULT_TV_POWER_CODE: &str = "AAAAAQAAAAEAAAAuAw==";

/// Cap on `getContentList` pages fetched per source. A set that keeps
/// answering with a non-advancing index would otherwise hold the caller
/// forever.
const MAX_CONTENT_PAGES: usize = 50;

/// Input schemes enumerated when building the source map
const SOURCE_SCHEMES: [&str; 2] = ["tv", "extInput"];

/// Client for controlling a Sony Bravia television over its local HTTP API
///
/// The client pairs once via [`connect`](BraviaClient::connect) and then
/// drives the set through IRCC remote codes and JSON-RPC-style queries.
/// The remote-code table, the source map, and the app list are fetched
/// lazily on first use and kept until
/// [`invalidate_caches`](BraviaClient::invalidate_caches) is called.
///
/// Calls are sequential and blocking on the network; the caches use brief
/// internal locks only, so concurrent callers at worst duplicate a fetch.
pub struct BraviaClient {
    transport: Transport,
    mac: Option<MacAddr>,
    commands: Mutex<Option<Vec<RemoteCommand>>>,
    sources: Mutex<Option<BTreeMap<String, String>>>,
    apps: Mutex<Option<BTreeMap<String, String>>>,
}

impl BraviaClient {
    /// Create a client for the set at `host`
    ///
    /// The hardware address is only needed for
    /// [`turn_on`](BraviaClient::turn_on) via wake-on-LAN.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use bravia_rc::BraviaClient;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = BraviaClient::new("192.168.1.50", Some("AA:BB:CC:DD:EE:FF".parse()?))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(host: impl Into<String>, mac: Option<MacAddr>) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(host)?,
            mac,
            commands: Mutex::new(None),
            sources: Mutex::new(None),
            apps: Mutex::new(None),
        })
    }

    /// Get the host this client talks to
    pub fn host(&self) -> &str {
        self.transport.host()
    }

    /// Pair with the set and store the authentication cookie
    ///
    /// Pairing is a two-step handshake: a first call with an empty PIN makes
    /// the set display a PIN on screen, and a second call carrying that PIN
    /// completes registration. A paired client stays usable until the set
    /// forgets it; there is no disconnect.
    ///
    /// On any failure the previously stored session is left untouched.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use bravia_rc::BraviaClient;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = BraviaClient::new("192.168.1.50", None)?;
    /// // First call: the set shows a PIN on screen.
    /// let _ = client.connect("", "my-remote:1", "Living Room Remote").await;
    /// // Second call with the displayed PIN completes pairing.
    /// client.connect("4321", "my-remote:1", "Living Room Remote").await?;
    /// assert!(client.is_connected());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(&self, pin: &str, client_id: &str, nickname: &str) -> Result<()> {
        let request = RpcRequest::new("actRegister")
            .with_params(json!({
                "clientid": client_id,
                "nickname": nickname,
                "level": "private",
            }))
            .with_params(json!([{"value": "yes", "function": "WOL"}]));
        self.transport.register(pin, &request).await
    }

    /// Check whether an authentication cookie is stored
    ///
    /// Does not verify the cookie with the set.
    pub fn is_connected(&self) -> bool {
        self.transport.is_paired()
    }

    /// Send a raw IRCC code and return the SOAP response body
    pub async fn send_ircc(&self, code: &str) -> Result<String> {
        self.transport.send_ircc(code).await
    }

    /// Send a remote command by name, e.g. `VolumeUp`
    ///
    /// Fetches the code table on first use. An unknown name is
    /// [`BraviaError::UnknownCommand`]; nothing is sent for it.
    pub async fn send_command(&self, name: &str) -> Result<()> {
        let code = self
            .command_code(name)
            .await?
            .ok_or_else(|| BraviaError::UnknownCommand(name.to_string()))?;
        self.transport.send_ircc(&code).await?;
        Ok(())
    }

    /// Look up the IRCC code for a command name
    ///
    /// The code table is fetched once and cached; `Ok(None)` means the set
    /// does not know the name. Matching is exact.
    pub async fn command_code(&self, name: &str) -> Result<Option<String>> {
        if self.commands.lock().unwrap().is_none() {
            self.refresh_commands().await?;
        }
        let commands = self.commands.lock().unwrap();
        Ok(commands
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .find(|command| command.name == name)
            .map(|command| command.value.clone()))
    }

    /// Re-fetch the remote-controller code table
    pub async fn refresh_commands(&self) -> Result<()> {
        let response = self
            .transport
            .json_rpc(service::SYSTEM, &RpcRequest::new("getRemoteControllerInfo"))
            .await?;
        let result = response.into_result()?;
        // Result element 0 is controller metadata; element 1 is the table.
        let table = result.get(1).cloned().ok_or_else(|| {
            BraviaError::InvalidResponse("remote controller info carried no code table".to_string())
        })?;
        let table: Vec<RemoteCommand> = serde_json::from_value(table)?;
        tracing::debug!(commands = table.len(), "refreshed remote code table");
        *self.commands.lock().unwrap() = Some(table);
        Ok(())
    }

    /// Enumerate all content under a source URI, e.g. `tv:dvbt`
    ///
    /// Pages through `getContentList` until the set returns an empty page or
    /// reports an error. Pagination follows the index of the last item on
    /// each page, and is cut off when that index stops advancing or after a
    /// fixed page cap.
    pub async fn content_list(&self, source: &str) -> Result<Vec<ContentItem>> {
        let mut items: Vec<ContentItem> = Vec::new();
        let mut start_index: i64 = 0;

        for page_count in 0.. {
            if page_count >= MAX_CONTENT_PAGES {
                tracing::warn!(source, "content enumeration cut off after {MAX_CONTENT_PAGES} pages");
                break;
            }

            let request = RpcRequest::new("getContentList")
                .with_params(json!({"source": source, "stIdx": start_index}));
            let response = self.transport.json_rpc(service::AV_CONTENT, &request).await?;

            let page = match response.into_result() {
                Ok(result) => match result.into_iter().next() {
                    Some(value) => serde_json::from_value::<Vec<ContentItem>>(value)?,
                    None => break,
                },
                // Enumerating past the end of some sources reports an error.
                Err(BraviaError::Device { code, message }) => {
                    tracing::debug!(source, code, %message, "content enumeration stopped");
                    break;
                }
                Err(e) => return Err(e),
            };
            if page.is_empty() {
                break;
            }

            let next_index = page.last().map_or(start_index, |item| item.index + 1);
            items.extend(page);
            if next_index <= start_index {
                break;
            }
            start_index = next_index;
        }

        Ok(items)
    }

    /// Build the source map: display name to playable URI
    ///
    /// Enumerates the `tv` and `extInput` schemes, lists the content of each
    /// source, and merges in the app list. Items are keyed by display title;
    /// items without one are skipped. The cached map is replaced in full.
    pub async fn load_source_list(&self) -> Result<BTreeMap<String, String>> {
        let mut mapping = BTreeMap::new();

        for scheme in SOURCE_SCHEMES {
            let request = RpcRequest::new("getSourceList").with_params(json!({"scheme": scheme}));
            let response = self
                .transport
                .json_rpc(service::AV_CONTENT_ROOT, &request)
                .await?;

            let sources: Vec<InputSource> = match response.into_result() {
                Ok(result) => match result.into_iter().next() {
                    Some(value) => serde_json::from_value(value)?,
                    None => Vec::new(),
                },
                // Not every model supports every scheme.
                Err(BraviaError::Device { code, message }) => {
                    tracing::debug!(scheme, code, %message, "scheme not available");
                    Vec::new()
                }
                Err(e) => return Err(e),
            };

            for source in sources {
                for item in self.content_list(&source.source).await? {
                    if let (Some(title), Some(uri)) = (item.title, item.uri) {
                        mapping.insert(title, uri);
                    }
                }
            }
        }

        mapping.extend(self.load_app_list().await?);
        *self.sources.lock().unwrap() = Some(mapping.clone());
        Ok(mapping)
    }

    /// Fetch the installed apps: title to launch URI
    ///
    /// The cached list is replaced in full.
    pub async fn load_app_list(&self) -> Result<BTreeMap<String, String>> {
        let response = self
            .transport
            .json_rpc(service::APP_CONTROL, &RpcRequest::new("getApplicationList"))
            .await?;

        let mut apps = BTreeMap::new();
        for value in response.into_result()? {
            let list: Vec<App> = serde_json::from_value(value)?;
            for app in list {
                apps.insert(app.title, app.uri);
            }
        }
        *self.apps.lock().unwrap() = Some(apps.clone());
        Ok(apps)
    }

    /// Get a snapshot of what is currently playing
    ///
    /// `Ok(None)` when the set reports an error for the query, which it does
    /// whenever the panel is off or no content is active.
    pub async fn playing_info(&self) -> Result<Option<PlayingInfo>> {
        let response = self
            .transport
            .json_rpc(service::AV_CONTENT, &RpcRequest::new("getPlayingContentInfo"))
            .await?;

        match response.into_result() {
            Ok(result) => match result.into_iter().next() {
                Some(value) => Ok(Some(serde_json::from_value(value)?)),
                None => Ok(None),
            },
            Err(BraviaError::Device { code, message }) => {
                tracing::debug!(code, %message, "no playing content info");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Get the power status of the set
    ///
    /// An unreachable or misbehaving set reads as [`PowerStatus::Off`];
    /// this call never fails, so it is safe for high-frequency polling.
    pub async fn power_status(&self) -> PowerStatus {
        match self.try_power_status().await {
            Ok(status) => status,
            Err(e) => {
                tracing::debug!(error = %e, "power status query failed");
                PowerStatus::Off
            }
        }
    }

    async fn try_power_status(&self) -> Result<PowerStatus> {
        let response = self
            .transport
            .json_rpc(service::SYSTEM, &RpcRequest::new("getPowerStatus"))
            .await?;
        let result = response.into_result()?;
        let status = result
            .first()
            .and_then(|value| value.get("status"))
            .and_then(|value| value.as_str())
            .ok_or_else(|| {
                BraviaError::InvalidResponse("power status response carried no status".to_string())
            })?;
        Ok(match status {
            "active" => PowerStatus::Active,
            "standby" => PowerStatus::Standby,
            _ => PowerStatus::Off,
        })
    }

    /// Get the volume record for the `speaker` target
    ///
    /// `Ok(None)` when the set has no speaker target.
    pub async fn volume_info(&self) -> Result<Option<VolumeInfo>> {
        let response = self
            .transport
            .json_rpc(service::AUDIO, &RpcRequest::new("getVolumeInformation"))
            .await?;
        let result = response.into_result()?;
        let Some(value) = result.into_iter().next() else {
            return Ok(None);
        };
        let targets: Vec<VolumeInfo> = serde_json::from_value(value)?;
        Ok(targets.into_iter().find(|info| info.target == "speaker"))
    }

    /// Set the speaker volume as a fraction of full scale
    ///
    /// The service wants an integer percentage as a string, so `0.5` is sent
    /// as `"50"`. Values outside `0.0..=1.0` are forwarded untouched and
    /// rejected by the set itself.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use bravia_rc::BraviaClient;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// # let client = BraviaClient::new("192.168.1.50", None)?;
    /// client.set_volume_level(0.25).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn set_volume_level(&self, volume: f64) -> Result<()> {
        let api_volume = (volume * 100.0).round() as i64;
        let request = RpcRequest::new("setAudioVolume").with_params(json!({
            "target": "speaker",
            "volume": api_volume.to_string(),
        }));
        self.transport
            .json_rpc(service::AUDIO, &request)
            .await?
            .into_result()?;
        Ok(())
    }

    /// Turn the set on
    ///
    /// Broadcasts a wake-on-LAN packet when a hardware address is configured.
    /// Wake-on-LAN alone does not rouse every model, so unless the set
    /// already reports active, the power key is sent as well; if the code
    /// table cannot be fetched (the set is still waking), a fixed default
    /// power code is used.
    pub async fn turn_on(&self) -> Result<()> {
        if let Some(mac) = self.mac {
            wol::send_magic_packet(mac).await?;
        }
        if self.power_status().await != PowerStatus::Active {
            let code = self
                .command_code("TvPower")
                .await
                .unwrap_or(None)
                .unwrap_or_else(|| DEFAULT_TV_POWER_CODE.to_string());
            self.transport.send_ircc(&code).await?;
        }
        Ok(())
    }

    /// Turn the set off
    pub async fn turn_off(&self) -> Result<()> {
        self.send_command("PowerOff").await
    }

    /// Step the volume up one notch
    pub async fn volume_up(&self) -> Result<()> {
        self.send_command("VolumeUp").await
    }

    /// Step the volume down one notch
    pub async fn volume_down(&self) -> Result<()> {
        self.send_command("VolumeDown").await
    }

    /// Toggle mute
    pub async fn mute_volume(&self) -> Result<()> {
        self.send_command("Mute").await
    }

    /// Send the play transport key
    pub async fn media_play(&self) -> Result<()> {
        self.send_command("Play").await
    }

    /// Send the pause transport key
    pub async fn media_pause(&self) -> Result<()> {
        self.send_command("Pause").await
    }

    /// Send the stop transport key
    pub async fn media_stop(&self) -> Result<()> {
        self.send_command("Stop").await
    }

    /// Skip to the next track or chapter
    pub async fn media_next_track(&self) -> Result<()> {
        self.send_command("Next").await
    }

    /// Skip to the previous track or chapter
    pub async fn media_previous_track(&self) -> Result<()> {
        self.send_command("Prev").await
    }

    /// Switch to an input or channel by display name
    ///
    /// Loads the source map on first use. An unknown name is a silent no-op;
    /// nothing is sent for it.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use bravia_rc::BraviaClient;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// # let client = BraviaClient::new("192.168.1.50", None)?;
    /// client.select_source("HDMI 2").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn select_source(&self, name: &str) -> Result<()> {
        if self.sources.lock().unwrap().is_none() {
            self.load_source_list().await?;
        }
        let uri = {
            let sources = self.sources.lock().unwrap();
            sources.as_ref().and_then(|map| map.get(name).cloned())
        };
        match uri {
            Some(uri) => self.play_content(&uri).await,
            None => {
                tracing::debug!(name, "source name not in source map");
                Ok(())
            }
        }
    }

    /// Play content by URI
    ///
    /// A URI known from the app list is activated through `setActiveApp`;
    /// anything else goes through `setPlayContent`.
    pub async fn play_content(&self, uri: &str) -> Result<()> {
        let is_app = {
            let apps = self.apps.lock().unwrap();
            apps.as_ref()
                .is_some_and(|map| map.values().any(|app_uri| app_uri == uri))
        };

        let (svc, request) = if is_app {
            (
                service::APP_CONTROL,
                RpcRequest::new("setActiveApp").with_params(json!({"uri": uri})),
            )
        } else {
            (
                service::AV_CONTENT_ROOT,
                RpcRequest::new("setPlayContent").with_params(json!({"uri": uri})),
            )
        };
        self.transport.json_rpc(svc, &request).await?.into_result()?;
        Ok(())
    }

    /// Launch an installed app by title
    ///
    /// Loads the app list on first use. An unknown title is a silent no-op.
    pub async fn start_app(&self, name: &str) -> Result<()> {
        if self.apps.lock().unwrap().is_none() {
            self.load_app_list().await?;
        }
        let uri = {
            let apps = self.apps.lock().unwrap();
            apps.as_ref().and_then(|map| map.get(name).cloned())
        };
        match uri {
            Some(uri) => {
                let request = RpcRequest::new("setActiveApp").with_params(json!({"uri": uri}));
                self.transport
                    .json_rpc(service::APP_CONTROL, &request)
                    .await?
                    .into_result()?;
                Ok(())
            }
            None => {
                tracing::debug!(name, "app title not in app list");
                Ok(())
            }
        }
    }

    /// Get system information for the set
    pub async fn system_info(&self) -> Result<SystemInfo> {
        let response = self
            .transport
            .json_rpc(service::SYSTEM, &RpcRequest::new("getSystemInformation"))
            .await?;
        let result = response.into_result()?;
        let value = result.into_iter().next().ok_or_else(|| {
            BraviaError::InvalidResponse("system information response was empty".to_string())
        })?;
        Ok(serde_json::from_value(value)?)
    }

    /// Drop the cached code table, source map, and app list
    ///
    /// The next lookup through any of them fetches fresh data.
    pub fn invalidate_caches(&self) {
        *self.commands.lock().unwrap() = None;
        *self.sources.lock().unwrap() = None;
        *self.apps.lock().unwrap() = None;
    }
}
