//! Protocol definition tables
//!
//! Three layered command tables, ordered oldest to newest: the legacy
//! JSON-Wire set, the standard W3C set, and the mobile extension set.
//! Duplicate names across layers are resolved by the registry with
//! first-definition-wins.

use phf::phf_set;

/// Which object a command is installed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Session-scoped command
    Session,
    /// Element-scoped command, routed with the element reference attached
    Element,
}

/// HTTP verb used by a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Delete,
}

impl Verb {
    /// Verb as the wire method name
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Delete => "DELETE",
        }
    }
}

/// Static command descriptor
///
/// Derived once from the protocol tables and never mutated at runtime.
/// `path` is a URI template; `:sessionId` and `:elementId` are filled by the
/// session, any other `:placeholder` consumes leading call arguments, and the
/// remaining arguments are zipped with `params` into the request body.
#[derive(Debug, Clone, Copy)]
pub struct CommandDef {
    pub name: &'static str,
    pub scope: Scope,
    pub verb: Verb,
    pub path: &'static str,
    pub params: &'static [&'static str],
}

impl CommandDef {
    const fn session(
        name: &'static str,
        verb: Verb,
        path: &'static str,
        params: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            scope: Scope::Session,
            verb,
            path,
            params,
        }
    }

    const fn element(
        name: &'static str,
        verb: Verb,
        path: &'static str,
        params: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            scope: Scope::Element,
            verb,
            path,
            params,
        }
    }
}

/// Commands never auto-installed through the generic path
///
/// Session lifecycle, the four element-search variants, and both script
/// execution variants are hand-implemented (or reached through a
/// higher-level path) because they need special marshaling.
pub static EXCLUDED_COMMANDS: phf::Set<&'static str> = phf_set! {
    "newSession",
    "deleteSession",
    "findElement",
    "findElements",
    "findElementFromElement",
    "findElementsFromElement",
    "executeScript",
    "executeAsyncScript",
};

/// Legacy JSON-Wire commands
pub static JSONWP_COMMANDS: &[CommandDef] = &[
    CommandDef::session("getStatus", Verb::Get, "/status", &[]),
    CommandDef::session(
        "implicitWait",
        Verb::Post,
        "/session/:sessionId/timeouts/implicit_wait",
        &["ms"],
    ),
    CommandDef::session(
        "asyncScriptTimeout",
        Verb::Post,
        "/session/:sessionId/timeouts/async_script",
        &["ms"],
    ),
    CommandDef::session("getUrl", Verb::Get, "/session/:sessionId/url", &[]),
    CommandDef::session("navigateTo", Verb::Post, "/session/:sessionId/url", &["url"]),
    CommandDef::session("back", Verb::Post, "/session/:sessionId/back", &[]),
    CommandDef::session("forward", Verb::Post, "/session/:sessionId/forward", &[]),
    CommandDef::session("refresh", Verb::Post, "/session/:sessionId/refresh", &[]),
    CommandDef::session("getTitle", Verb::Get, "/session/:sessionId/title", &[]),
    CommandDef::session("getPageSource", Verb::Get, "/session/:sessionId/source", &[]),
    CommandDef::session(
        "executeScript",
        Verb::Post,
        "/session/:sessionId/execute",
        &["script", "args"],
    ),
    CommandDef::session(
        "executeAsyncScript",
        Verb::Post,
        "/session/:sessionId/execute_async",
        &["script", "args"],
    ),
    CommandDef::session(
        "getOrientation",
        Verb::Get,
        "/session/:sessionId/orientation",
        &[],
    ),
    CommandDef::session(
        "setOrientation",
        Verb::Post,
        "/session/:sessionId/orientation",
        &["orientation"],
    ),
    CommandDef::session("getGeoLocation", Verb::Get, "/session/:sessionId/location", &[]),
    CommandDef::session(
        "setGeoLocation",
        Verb::Post,
        "/session/:sessionId/location",
        &["location"],
    ),
    CommandDef::session(
        "moveTo",
        Verb::Post,
        "/session/:sessionId/moveto",
        &["element", "xoffset", "yoffset"],
    ),
    CommandDef::session("buttonDown", Verb::Post, "/session/:sessionId/buttondown", &["button"]),
    CommandDef::session("buttonUp", Verb::Post, "/session/:sessionId/buttonup", &["button"]),
    CommandDef::session("doubleClick", Verb::Post, "/session/:sessionId/doubleclick", &[]),
    CommandDef::session("touchDown", Verb::Post, "/session/:sessionId/touch/down", &["x", "y"]),
    CommandDef::session("touchUp", Verb::Post, "/session/:sessionId/touch/up", &["x", "y"]),
    CommandDef::session("touchMove", Verb::Post, "/session/:sessionId/touch/move", &["x", "y"]),
    CommandDef::session(
        "touchLongClick",
        Verb::Post,
        "/session/:sessionId/touch/longclick",
        &["element"],
    ),
    CommandDef::session(
        "touchFlick",
        Verb::Post,
        "/session/:sessionId/touch/flick",
        &["xspeed", "yspeed"],
    ),
    CommandDef::element(
        "submit",
        Verb::Post,
        "/session/:sessionId/element/:elementId/submit",
        &[],
    ),
    CommandDef::element(
        "getLocation",
        Verb::Get,
        "/session/:sessionId/element/:elementId/location",
        &[],
    ),
    CommandDef::element(
        "getLocationInView",
        Verb::Get,
        "/session/:sessionId/element/:elementId/location_in_view",
        &[],
    ),
    CommandDef::element(
        "getSize",
        Verb::Get,
        "/session/:sessionId/element/:elementId/size",
        &[],
    ),
    CommandDef::element(
        "isDisplayed",
        Verb::Get,
        "/session/:sessionId/element/:elementId/displayed",
        &[],
    ),
];

/// Standard W3C commands
pub static W3C_COMMANDS: &[CommandDef] = &[
    CommandDef::session("newSession", Verb::Post, "/session", &["capabilities"]),
    CommandDef::session("deleteSession", Verb::Delete, "/session/:sessionId", &[]),
    CommandDef::session("getTimeouts", Verb::Get, "/session/:sessionId/timeouts", &[]),
    CommandDef::session(
        "setTimeouts",
        Verb::Post,
        "/session/:sessionId/timeouts",
        &["implicit", "pageLoad", "script"],
    ),
    CommandDef::session("getUrl", Verb::Get, "/session/:sessionId/url", &[]),
    CommandDef::session("navigateTo", Verb::Post, "/session/:sessionId/url", &["url"]),
    CommandDef::session("back", Verb::Post, "/session/:sessionId/back", &[]),
    CommandDef::session("forward", Verb::Post, "/session/:sessionId/forward", &[]),
    CommandDef::session("refresh", Verb::Post, "/session/:sessionId/refresh", &[]),
    CommandDef::session("getTitle", Verb::Get, "/session/:sessionId/title", &[]),
    CommandDef::session("getWindowHandle", Verb::Get, "/session/:sessionId/window", &[]),
    CommandDef::session("closeWindow", Verb::Delete, "/session/:sessionId/window", &[]),
    CommandDef::session(
        "switchToWindow",
        Verb::Post,
        "/session/:sessionId/window",
        &["handle"],
    ),
    CommandDef::session(
        "getWindowHandles",
        Verb::Get,
        "/session/:sessionId/window/handles",
        &[],
    ),
    CommandDef::session("newWindow", Verb::Post, "/session/:sessionId/window/new", &["type"]),
    CommandDef::session("switchToFrame", Verb::Post, "/session/:sessionId/frame", &["id"]),
    CommandDef::session(
        "switchToParentFrame",
        Verb::Post,
        "/session/:sessionId/frame/parent",
        &[],
    ),
    CommandDef::session("getWindowRect", Verb::Get, "/session/:sessionId/window/rect", &[]),
    CommandDef::session(
        "setWindowRect",
        Verb::Post,
        "/session/:sessionId/window/rect",
        &["x", "y", "width", "height"],
    ),
    CommandDef::session(
        "maximizeWindow",
        Verb::Post,
        "/session/:sessionId/window/maximize",
        &[],
    ),
    CommandDef::session(
        "minimizeWindow",
        Verb::Post,
        "/session/:sessionId/window/minimize",
        &[],
    ),
    CommandDef::session(
        "fullscreenWindow",
        Verb::Post,
        "/session/:sessionId/window/fullscreen",
        &[],
    ),
    CommandDef::session(
        "getActiveElement",
        Verb::Get,
        "/session/:sessionId/element/active",
        &[],
    ),
    CommandDef::session("getPageSource", Verb::Get, "/session/:sessionId/source", &[]),
    CommandDef::session(
        "findElement",
        Verb::Post,
        "/session/:sessionId/element",
        &["using", "value"],
    ),
    CommandDef::session(
        "findElements",
        Verb::Post,
        "/session/:sessionId/elements",
        &["using", "value"],
    ),
    CommandDef::element(
        "findElementFromElement",
        Verb::Post,
        "/session/:sessionId/element/:elementId/element",
        &["using", "value"],
    ),
    CommandDef::element(
        "findElementsFromElement",
        Verb::Post,
        "/session/:sessionId/element/:elementId/elements",
        &["using", "value"],
    ),
    CommandDef::session(
        "executeScript",
        Verb::Post,
        "/session/:sessionId/execute/sync",
        &["script", "args"],
    ),
    CommandDef::session(
        "executeAsyncScript",
        Verb::Post,
        "/session/:sessionId/execute/async",
        &["script", "args"],
    ),
    CommandDef::session("getAllCookies", Verb::Get, "/session/:sessionId/cookie", &[]),
    CommandDef::session("addCookie", Verb::Post, "/session/:sessionId/cookie", &["cookie"]),
    CommandDef::session("deleteAllCookies", Verb::Delete, "/session/:sessionId/cookie", &[]),
    CommandDef::session("getNamedCookie", Verb::Get, "/session/:sessionId/cookie/:name", &[]),
    CommandDef::session(
        "deleteCookie",
        Verb::Delete,
        "/session/:sessionId/cookie/:name",
        &[],
    ),
    CommandDef::session(
        "performActions",
        Verb::Post,
        "/session/:sessionId/actions",
        &["actions"],
    ),
    CommandDef::session("releaseActions", Verb::Delete, "/session/:sessionId/actions", &[]),
    CommandDef::session("dismissAlert", Verb::Post, "/session/:sessionId/alert/dismiss", &[]),
    CommandDef::session("acceptAlert", Verb::Post, "/session/:sessionId/alert/accept", &[]),
    CommandDef::session("getAlertText", Verb::Get, "/session/:sessionId/alert/text", &[]),
    CommandDef::session(
        "sendAlertText",
        Verb::Post,
        "/session/:sessionId/alert/text",
        &["text"],
    ),
    CommandDef::session("takeScreenshot", Verb::Get, "/session/:sessionId/screenshot", &[]),
    CommandDef::session("printPage", Verb::Post, "/session/:sessionId/print", &["options"]),
    CommandDef::element(
        "isElementSelected",
        Verb::Get,
        "/session/:sessionId/element/:elementId/selected",
        &[],
    ),
    CommandDef::element(
        "getAttribute",
        Verb::Get,
        "/session/:sessionId/element/:elementId/attribute/:name",
        &[],
    ),
    CommandDef::element(
        "getProperty",
        Verb::Get,
        "/session/:sessionId/element/:elementId/property/:name",
        &[],
    ),
    CommandDef::element(
        "getCssValue",
        Verb::Get,
        "/session/:sessionId/element/:elementId/css/:propertyName",
        &[],
    ),
    CommandDef::element(
        "getText",
        Verb::Get,
        "/session/:sessionId/element/:elementId/text",
        &[],
    ),
    CommandDef::element(
        "getTagName",
        Verb::Get,
        "/session/:sessionId/element/:elementId/name",
        &[],
    ),
    CommandDef::element(
        "getElementRect",
        Verb::Get,
        "/session/:sessionId/element/:elementId/rect",
        &[],
    ),
    CommandDef::element(
        "isElementEnabled",
        Verb::Get,
        "/session/:sessionId/element/:elementId/enabled",
        &[],
    ),
    CommandDef::element(
        "click",
        Verb::Post,
        "/session/:sessionId/element/:elementId/click",
        &[],
    ),
    CommandDef::element(
        "clear",
        Verb::Post,
        "/session/:sessionId/element/:elementId/clear",
        &[],
    ),
    CommandDef::element(
        "sendKeys",
        Verb::Post,
        "/session/:sessionId/element/:elementId/value",
        &["text"],
    ),
    CommandDef::element(
        "takeElementScreenshot",
        Verb::Get,
        "/session/:sessionId/element/:elementId/screenshot",
        &[],
    ),
    CommandDef::element(
        "getComputedRole",
        Verb::Get,
        "/session/:sessionId/element/:elementId/computedrole",
        &[],
    ),
    CommandDef::element(
        "getComputedLabel",
        Verb::Get,
        "/session/:sessionId/element/:elementId/computedlabel",
        &[],
    ),
];

/// Mobile extension commands
pub static MOBILE_COMMANDS: &[CommandDef] = &[
    CommandDef::session("getSession", Verb::Get, "/session/:sessionId", &[]),
    CommandDef::session("getContexts", Verb::Get, "/session/:sessionId/contexts", &[]),
    CommandDef::session("getCurrentContext", Verb::Get, "/session/:sessionId/context", &[]),
    CommandDef::session("setContext", Verb::Post, "/session/:sessionId/context", &["name"]),
    CommandDef::session(
        "getOrientation",
        Verb::Get,
        "/session/:sessionId/orientation",
        &[],
    ),
    CommandDef::session("shake", Verb::Post, "/session/:sessionId/appium/device/shake", &[]),
    CommandDef::session(
        "lock",
        Verb::Post,
        "/session/:sessionId/appium/device/lock",
        &["seconds"],
    ),
    CommandDef::session("unlock", Verb::Post, "/session/:sessionId/appium/device/unlock", &[]),
    CommandDef::session(
        "isLocked",
        Verb::Post,
        "/session/:sessionId/appium/device/is_locked",
        &[],
    ),
    CommandDef::session(
        "pressKeyCode",
        Verb::Post,
        "/session/:sessionId/appium/device/press_keycode",
        &["keycode", "metastate"],
    ),
    CommandDef::session(
        "longPressKeyCode",
        Verb::Post,
        "/session/:sessionId/appium/device/long_press_keycode",
        &["keycode", "metastate"],
    ),
    CommandDef::session(
        "hideKeyboard",
        Verb::Post,
        "/session/:sessionId/appium/device/hide_keyboard",
        &["strategy", "key"],
    ),
    CommandDef::session(
        "isKeyboardShown",
        Verb::Get,
        "/session/:sessionId/appium/device/is_keyboard_shown",
        &[],
    ),
    CommandDef::session(
        "getDeviceTime",
        Verb::Get,
        "/session/:sessionId/appium/device/system_time",
        &[],
    ),
    CommandDef::session(
        "getSystemBars",
        Verb::Get,
        "/session/:sessionId/appium/device/system_bars",
        &[],
    ),
    CommandDef::session(
        "getDisplayDensity",
        Verb::Get,
        "/session/:sessionId/appium/device/display_density",
        &[],
    ),
    CommandDef::session(
        "pushFile",
        Verb::Post,
        "/session/:sessionId/appium/device/push_file",
        &["path", "data"],
    ),
    CommandDef::session(
        "pullFile",
        Verb::Post,
        "/session/:sessionId/appium/device/pull_file",
        &["path"],
    ),
    CommandDef::session(
        "pullFolder",
        Verb::Post,
        "/session/:sessionId/appium/device/pull_folder",
        &["path"],
    ),
    CommandDef::session(
        "startActivity",
        Verb::Post,
        "/session/:sessionId/appium/device/start_activity",
        &["appPackage", "appActivity"],
    ),
    CommandDef::session(
        "getCurrentActivity",
        Verb::Get,
        "/session/:sessionId/appium/device/current_activity",
        &[],
    ),
    CommandDef::session(
        "getCurrentPackage",
        Verb::Get,
        "/session/:sessionId/appium/device/current_package",
        &[],
    ),
    CommandDef::session(
        "installApp",
        Verb::Post,
        "/session/:sessionId/appium/device/install_app",
        &["appPath"],
    ),
    CommandDef::session(
        "removeApp",
        Verb::Post,
        "/session/:sessionId/appium/device/remove_app",
        &["appId"],
    ),
    CommandDef::session(
        "isAppInstalled",
        Verb::Post,
        "/session/:sessionId/appium/device/app_installed",
        &["bundleId"],
    ),
    CommandDef::session(
        "activateApp",
        Verb::Post,
        "/session/:sessionId/appium/device/activate_app",
        &["appId"],
    ),
    CommandDef::session(
        "terminateApp",
        Verb::Post,
        "/session/:sessionId/appium/device/terminate_app",
        &["appId"],
    ),
    CommandDef::session(
        "queryAppState",
        Verb::Post,
        "/session/:sessionId/appium/device/app_state",
        &["appId"],
    ),
    CommandDef::session(
        "background",
        Verb::Post,
        "/session/:sessionId/appium/app/background",
        &["seconds"],
    ),
    CommandDef::session(
        "getClipboard",
        Verb::Post,
        "/session/:sessionId/appium/device/get_clipboard",
        &["contentType"],
    ),
    CommandDef::session(
        "setClipboard",
        Verb::Post,
        "/session/:sessionId/appium/device/set_clipboard",
        &["content", "contentType", "label"],
    ),
    CommandDef::session(
        "getPerformanceData",
        Verb::Post,
        "/session/:sessionId/appium/getPerformanceData",
        &["packageName", "dataType", "dataReadTimeout"],
    ),
    CommandDef::session(
        "getPerformanceDataTypes",
        Verb::Post,
        "/session/:sessionId/appium/performanceData/types",
        &[],
    ),
    CommandDef::session(
        "toggleLocationServices",
        Verb::Post,
        "/session/:sessionId/appium/device/toggle_location_services",
        &[],
    ),
    CommandDef::session(
        "fingerprint",
        Verb::Post,
        "/session/:sessionId/appium/device/finger_print",
        &["fingerprintId"],
    ),
    CommandDef::session(
        "touchId",
        Verb::Post,
        "/session/:sessionId/appium/simulator/touch_id",
        &["match"],
    ),
    CommandDef::session("getSettings", Verb::Get, "/session/:sessionId/appium/settings", &[]),
    CommandDef::session(
        "updateSettings",
        Verb::Post,
        "/session/:sessionId/appium/settings",
        &["settings"],
    ),
    CommandDef::session("getLogTypes", Verb::Get, "/session/:sessionId/log/types", &[]),
    CommandDef::session("getLogs", Verb::Post, "/session/:sessionId/log", &["type"]),
];

/// All protocol tables in layering order
pub static PROTOCOL_TABLES: &[&[CommandDef]] = &[JSONWP_COMMANDS, W3C_COMMANDS, MOBILE_COMMANDS];
