// StrideWatch: HTTP Dashboard Page
//
// Served on `GET /`. Shows the step counter (with the display offset) and the
// fall flag.

use std::fmt::Write;

use crate::events::Snapshot;
use crate::settings::DisplaySettings;

const FALL_COLOR: &str = "#e74c3c";
const OK_COLOR: &str = "#27ae60";

pub fn render(snapshot: &Snapshot, display: &DisplaySettings) -> String {
    let fall = snapshot.fall.is_fall();
    let mut html = String::with_capacity(1200);

    html.push_str("<!DOCTYPE html><html lang='en'>");
    html.push_str("<head><meta charset='UTF-8'>");
    html.push_str("<meta name='viewport' content='width=device-width, initial-scale=1.0'>");
    html.push_str("<title>Health Device Dashboard</title>");
    html.push_str("<style>");
    html.push_str("body { font-family: Arial, sans-serif; background-color: #f4f4f4; margin: 0; padding: 20px; }");
    html.push_str("h1 { color: #333; }");
    html.push_str(".container { max-width: 600px; margin: 0 auto; padding: 20px; background: white; border-radius: 8px; box-shadow: 0 2px 10px rgba(0, 0, 0, 0.1); }");
    html.push_str(".status { font-size: 1.5em; }");
    html.push_str(".step-count { font-weight: bold; color: #2c3e50; }");
    // Writing into a String cannot fail.
    let _ = write!(
        html,
        ".fall-status {{ font-weight: bold; color: {}; }}",
        if fall { FALL_COLOR } else { OK_COLOR }
    );
    html.push_str(".footer { margin-top: 20px; font-size: 0.9em; color: #888; text-align: center; }");
    html.push_str("</style>");
    html.push_str("</head><body>");
    html.push_str("<div class='container'>");
    html.push_str("<h1> Health Device Dashboard</h1>");
    let _ = write!(
        html,
        "<p class='status'>Steps: <span class='step-count'>{}</span></p>",
        display.shown_steps(snapshot.steps)
    );
    let _ = write!(
        html,
        "<p class='status'>Fall Detected: <span class='fall-status'>{}</span></p>",
        if fall { "Yes" } else { "No" }
    );
    html.push_str("<div class='footer'>Powered by ESP32</div>");
    html.push_str("</div>");
    html.push_str("</body></html>");
    html
}
