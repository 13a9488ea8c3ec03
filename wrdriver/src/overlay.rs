//! On-screen countdown overlay.
//!
//! Drivers that can execute JavaScript in the displayed page inject
//! this snippet after navigating: a thin progress bar pinned to the top
//! of the viewport, counting down the entry's dwell time.

use std::time::Duration;

const OVERLAY_TEMPLATE: &str = r#"
function addStyleString(str) {
    var node = document.createElement('style');
    node.innerHTML = str;
    document.body.appendChild(node);
}

const duration = __DURATION__;
var block_to_insert = document.createElement('div');
block_to_insert.className = "webrotor-overlay";
block_to_insert.innerHTML = '<progress value="0" max=__DURATION__ id="progressBar"></progress>';

addStyleString('.webrotor-overlay{ position: fixed; top: 0; left: 0; height: 0px; width: 100%; z-index: 10000; background: white }');
addStyleString('#progressBar{ -webkit-appearance: none; appearance: none; height: 5px; width: 100% }');

document.body.appendChild(block_to_insert);

var timeleft = duration;
var downloadTimer = setInterval(function(){
  document.getElementById("progressBar").value = duration - --timeleft;

  if(timeleft <= 0)
    clearInterval(downloadTimer);
}, 1000);
"#;

/// Builds the countdown script for one entry's dwell time.
pub fn overlay_script(duration: Duration) -> String {
    let seconds = duration.as_secs_f64().round() as u64;
    OVERLAY_TEMPLATE.replace("__DURATION__", &seconds.to_string())
}
