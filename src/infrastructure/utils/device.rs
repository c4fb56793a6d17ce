use once_cell::sync::Lazy;
use regex::Regex;

use crate::entities::analytics::DeviceType;

static TABLET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)tablet|ipad|playbook|silk").expect("valid tablet regex")
});

static MOBILE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Mobile|Android|iP(hone|od)|IEMobile|BlackBerry|Kindle|Silk-Accelerated|(hpw|web)OS|Opera M(obi|ini)")
        .expect("valid mobile regex")
});

/// What a page view records about the visitor's browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserAgentInfo {
    pub device: DeviceType,
    pub browser: &'static str,
    pub os: &'static str,
}

impl UserAgentInfo {
    pub fn parse(user_agent: &str) -> Self {
        UserAgentInfo {
            device: device_type(user_agent),
            browser: browser(user_agent),
            os: operating_system(user_agent),
        }
    }
}

pub fn device_type(ua: &str) -> DeviceType {
    if TABLET_RE.is_match(ua) || is_android_tablet(ua) {
        return DeviceType::Tablet;
    }
    if MOBILE_RE.is_match(ua) {
        return DeviceType::Mobile;
    }
    DeviceType::Desktop
}

// Android devices without "mobi" after the platform token are tablets.
fn is_android_tablet(ua: &str) -> bool {
    let lower = ua.to_lowercase();
    lower
        .rfind("android")
        .is_some_and(|at| !lower[at..].contains("mobi"))
}

/// Chromium-based Edge and Opera also advertise "Chrome", so they are checked first.
pub fn browser(ua: &str) -> &'static str {
    if ua.contains("Edg/") || ua.contains("Edge") {
        "Edge"
    } else if ua.contains("OPR/") || ua.contains("Opera") {
        "Opera"
    } else if ua.contains("Firefox") {
        "Firefox"
    } else if ua.contains("Chrome") {
        "Chrome"
    } else if ua.contains("Safari") {
        "Safari"
    } else {
        "Other"
    }
}

pub fn operating_system(ua: &str) -> &'static str {
    if ua.contains("Win") {
        "Windows"
    } else if ua.contains("Android") {
        "Android"
    } else if ua.contains("iPhone") || ua.contains("iPad") || ua.contains("iPod") || ua.contains("iOS") {
        "iOS"
    } else if ua.contains("Mac") {
        "macOS"
    } else if ua.contains("Linux") {
        "Linux"
    } else {
        "Other"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESKTOP_CHROME: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const DESKTOP_EDGE: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0";
    const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
    const IPAD: &str = "Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
    const ANDROID_PHONE: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36";
    const ANDROID_TABLET: &str = "Mozilla/5.0 (Linux; Android 13; SM-X700) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const LINUX_FIREFOX: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";

    #[test]
    fn devices_are_classified() {
        assert_eq!(device_type(DESKTOP_CHROME), DeviceType::Desktop);
        assert_eq!(device_type(IPHONE), DeviceType::Mobile);
        assert_eq!(device_type(IPAD), DeviceType::Tablet);
        assert_eq!(device_type(ANDROID_PHONE), DeviceType::Mobile);
        assert_eq!(device_type(ANDROID_TABLET), DeviceType::Tablet);
        assert_eq!(device_type(""), DeviceType::Desktop);
    }

    #[test]
    fn chromium_forks_are_not_reported_as_chrome() {
        assert_eq!(browser(DESKTOP_EDGE), "Edge");
        assert_eq!(browser(DESKTOP_CHROME), "Chrome");
        assert_eq!(browser(IPHONE), "Safari");
        assert_eq!(browser(LINUX_FIREFOX), "Firefox");
        assert_eq!(browser("curl/8.0"), "Other");
    }

    #[test]
    fn mobile_platforms_win_over_their_desktop_kernels() {
        assert_eq!(operating_system(ANDROID_PHONE), "Android");
        assert_eq!(operating_system(IPHONE), "iOS");
        assert_eq!(operating_system(LINUX_FIREFOX), "Linux");
        assert_eq!(operating_system(DESKTOP_CHROME), "Windows");
    }

    #[test]
    fn parse_combines_all_three() {
        let info = UserAgentInfo::parse(IPAD);
        assert_eq!(info, UserAgentInfo { device: DeviceType::Tablet, browser: "Safari", os: "iOS" });
    }
}
