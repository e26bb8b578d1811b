//! JavaScript routines executed inside embedded web surfaces
//!
//! The only place the core reaches into a web surface's internal
//! representation: one routine that applies the reconciled native offset so
//! element geometry reported from the webview lines up with the native
//! screenshot.

/// Applies the webview-to-native offset inside the embedded surface
///
/// Arguments: `[top, left]`. Tags every element with its translated
/// absolute position and records the offset on the document root so
/// subsequently reported geometry shares the native coordinate space.
pub const APPLY_OFFSET_SCRIPT: &str = r#"
var top = arguments[0];
var left = arguments[1];
var root = document.documentElement;
root.setAttribute('data-native-offset-top', top);
root.setAttribute('data-native-offset-left', left);
var all = document.querySelectorAll('*');
for (var i = 0; i < all.length; i++) {
    var rect = all[i].getBoundingClientRect();
    all[i].setAttribute('data-native-x', Math.round(rect.left + left));
    all[i].setAttribute('data-native-y', Math.round(rect.top + top));
}
"#;
