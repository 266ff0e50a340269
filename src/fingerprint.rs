//! Environment snapshot for `about -me`.
//!
//! What a process can read about its host without asking, plus one
//! best-effort call to an IP geolocation endpoint. Collection runs on a worker thread and delivers
//! the formatted report over a channel; the shell renders a placeholder
//! until it lands. There is no cancellation: two rapid invocations race,
//! each toward its own transcript entry.

use std::sync::mpsc;
use std::thread;

const NOT_AVAILABLE: &str = "Not available";
const FETCH_FAILED: &str = "Failed to fetch";

#[cfg(feature = "geoip")]
const GEO_ENDPOINT: &str = "https://ipapi.co/json/";
#[cfg(feature = "geoip")]
const GEO_TIMEOUT_SECS: u64 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoInfo {
    pub ip: String,
    pub city: String,
    pub region: String,
    pub country: String,
    pub postal: String,
    pub coordinates: String,
    pub org: String,
}

impl GeoInfo {
    /// Every field degraded to the same sentinel. Network failure is not
    /// an error: the command still succeeds with this record.
    pub fn degraded() -> Self {
        let s = FETCH_FAILED.to_owned();
        Self {
            ip: s.clone(),
            city: s.clone(),
            region: s.clone(),
            country: s.clone(),
            postal: s.clone(),
            coordinates: s.clone(),
            org: s,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HostInfo {
    pub user: String,
    pub hostname: String,
    pub os: String,
    pub arch: String,
    pub shell: String,
    pub term: String,
    pub colorterm: String,
    pub color_depth: String,
    pub term_size: String,
    pub locale: String,
    pub cpu_cores: String,
    pub timezone_offset: String,
    pub local_time: String,
}

fn env_or(key: &str, fallback: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| fallback.to_owned())
}

fn detect_color_depth(term: &str, colorterm: &str) -> &'static str {
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        "24-bit (truecolor)"
    } else if term.contains("256") {
        "8-bit (256 colors)"
    } else {
        "4-bit (16 colors)"
    }
}

pub fn collect_host() -> HostInfo {
    let term = env_or("TERM", NOT_AVAILABLE);
    let colorterm = env_or("COLORTERM", "");
    let color_depth = detect_color_depth(&term, &colorterm).to_owned();

    let term_size = crossterm::terminal::size()
        .map(|(w, h)| format!("{w}x{h} cells"))
        .unwrap_or_else(|_| NOT_AVAILABLE.to_owned());

    let cpu_cores = thread::available_parallelism()
        .map(|n| n.get().to_string())
        .unwrap_or_else(|_| NOT_AVAILABLE.to_owned());

    let now = chrono::Local::now();
    let offset_secs = now.offset().local_minus_utc();
    let sign = if offset_secs < 0 { '-' } else { '+' };
    let offset_abs = offset_secs.abs();
    let timezone_offset = format!("UTC{}{}:{:02}", sign, offset_abs / 3600, (offset_abs % 3600) / 60);

    HostInfo {
        user: env_or("USER", NOT_AVAILABLE),
        hostname: env_or("HOSTNAME", NOT_AVAILABLE),
        os: std::env::consts::OS.to_owned(),
        arch: std::env::consts::ARCH.to_owned(),
        shell: env_or("SHELL", NOT_AVAILABLE),
        term,
        colorterm: if colorterm.is_empty() {
            "Not set".to_owned()
        } else {
            colorterm
        },
        color_depth,
        term_size,
        locale: env_or("LANG", NOT_AVAILABLE),
        cpu_cores,
        timezone_offset,
        local_time: now.format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}

#[cfg(feature = "geoip")]
pub fn fetch_geo() -> GeoInfo {
    let Ok(client) = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(GEO_TIMEOUT_SECS))
        .build()
    else {
        return GeoInfo::degraded();
    };

    let value: serde_json::Value = match client
        .get(GEO_ENDPOINT)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.json())
    {
        Ok(value) => value,
        Err(error) => {
            tracing::debug!("geo lookup failed: {error}");
            return GeoInfo::degraded();
        }
    };

    let field = |key: &str| -> String {
        match &value[key] {
            serde_json::Value::String(s) if !s.is_empty() => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            _ => NOT_AVAILABLE.to_owned(),
        }
    };
    let coordinates = match (&value["latitude"], &value["longitude"]) {
        (serde_json::Value::Number(lat), serde_json::Value::Number(lon)) => {
            format!("{lat}, {lon}")
        }
        _ => NOT_AVAILABLE.to_owned(),
    };

    GeoInfo {
        ip: field("ip"),
        city: field("city"),
        region: field("region"),
        country: field("country_name"),
        postal: field("postal"),
        coordinates,
        org: field("org"),
    }
}

#[cfg(not(feature = "geoip"))]
pub fn fetch_geo() -> GeoInfo {
    GeoInfo::degraded()
}

pub fn format_report(host: &HostInfo, geo: &GeoInfo) -> String {
    format!(
        "What I know about you (collected in real time):\n\
         \n\
         IP Address & Geolocation (no permission needed):\n\
         \x20 IP Address: {ip}\n\
         \x20 City: {city}\n\
         \x20 Region/State: {region}\n\
         \x20 Country: {country}\n\
         \x20 Postal Code: {postal}\n\
         \x20 Coordinates: {coordinates}\n\
         \x20 ISP/Organization: {org}\n\
         \n\
         There is more:\n\
         \n\
         Host & Session:\n\
         \x20 User: {user}\n\
         \x20 Hostname: {hostname}\n\
         \x20 Operating System: {os} ({arch})\n\
         \x20 Shell: {shell}\n\
         \x20 Terminal: {term}\n\
         \x20 COLORTERM: {colorterm}\n\
         \n\
         Display:\n\
         \x20 Terminal Size: {term_size}\n\
         \x20 Color Depth: {color_depth}\n\
         \n\
         Device & Locale:\n\
         \x20 CPU Cores: {cpu_cores}\n\
         \x20 Locale: {locale}\n\
         \x20 Timezone Offset: {timezone_offset}\n\
         \x20 Local Time: {local_time}",
        ip = geo.ip,
        city = geo.city,
        region = geo.region,
        country = geo.country,
        postal = geo.postal,
        coordinates = geo.coordinates,
        org = geo.org,
        user = host.user,
        hostname = host.hostname,
        os = host.os,
        arch = host.arch,
        shell = host.shell,
        term = host.term,
        colorterm = host.colorterm,
        term_size = host.term_size,
        color_depth = host.color_depth,
        cpu_cores = host.cpu_cores,
        locale = host.locale,
        timezone_offset = host.timezone_offset,
        local_time = host.local_time,
    )
}

/// Collect everything on a worker thread and deliver the formatted report.
/// Fire-and-forget: dropping the receiver just orphans the worker.
pub fn spawn_report() -> mpsc::Receiver<String> {
    let (sender, receiver) = mpsc::sync_channel::<String>(1);
    let spawned = thread::Builder::new()
        .name("kiosk-fingerprint".to_owned())
        .spawn(move || {
            let host = collect_host();
            let geo = fetch_geo();
            let _ = sender.send(format_report(&host, &geo));
        });
    if let Err(error) = spawned {
        tracing::warn!("failed to spawn fingerprint worker: {error}");
    }
    receiver
}
