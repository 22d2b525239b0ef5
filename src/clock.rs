/**
 * ============================================================================
 * CLOCK MODULE
 * ============================================================================
 *
 * PURPOSE: Wall-clock timestamps in the collector's wire format
 *
 * WIRE FORMAT:
 * Unix seconds rounded to hundredths, rendered as fixed-point scientific
 * notation with 12 fractional digits and an unsigned exponent:
 * 1692700000.1234 -> "1.692700000120E9"
 *
 * The same rendering is used for navigation chain entries, event times,
 * batch envelope times, and the sent_time form field.
 *
 * ============================================================================
 */

use rand::Rng;

/**
 * Render a Unix-seconds value in the collector's high-precision format
 * Rounds to hundredths of a second before formatting
 */
pub fn high_precision(unix_seconds: f64) -> String {
    let rounded = (unix_seconds * 100.0).round() / 100.0;
    // {:E} emits no '+' on the exponent, matching the wire shape exactly
    format!("{:.12E}", rounded)
}

/**
 * Current Unix time as fractional seconds
 */
pub fn unix_now() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/**
 * Current time in the high-precision wire format
 */
pub fn high_precision_now() -> String {
    high_precision(unix_now())
}

/**
 * Sent-time for outgoing requests
 * Jittered 20-300ms behind the wall clock, matching observed client traffic
 */
pub fn jittered_sent_time() -> String {
    let jitter = rand::thread_rng().gen_range(0.020..0.300);
    high_precision(unix_now() - jitter)
}
