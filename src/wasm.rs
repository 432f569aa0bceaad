use wasm_bindgen::prelude::*;

use crate::{normalize_json, EncodeOptions, Encoder, FormatVersion, Reader, TrackMetadata};

fn to_js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// route panics to the browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// encode mono PCM into a dMDFPWM container, one delta modulated stream per channel
///
/// # Arguments
/// * `samples` - Signed 16-bit mono PCM
/// * `channel_config` - JSON list of `{ "name", "index"?, "filter"? }`
/// * `chunk_size` - Bytes per channel per chunk
/// * `compact` - Use the single-byte descriptor length layout
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn encode_pcm_to_dmdfpwm(
    samples: &[i16],
    channel_config: &str,
    chunk_size: u16,
    compact: bool,
    artist: Option<String>,
    title: Option<String>,
    album: Option<String>,
) -> Result<Vec<u8>, JsValue> {
    let descriptors = normalize_json(channel_config).map_err(to_js_err)?;

    let options = EncodeOptions::default()
        .with_chunk_size(chunk_size)
        .with_version(if compact {
            FormatVersion::V0
        } else {
            FormatVersion::V1
        })
        .with_metadata(TrackMetadata::with_basic(
            artist.unwrap_or_default(),
            title.unwrap_or_default(),
            album.unwrap_or_default(),
        ));

    Encoder::new(options)
        .encode(samples, &descriptors)
        .map(|written| written.bytes)
        .map_err(to_js_err)
}

/// container summary as a JS object
#[wasm_bindgen]
pub fn get_container_info(data: &[u8]) -> Result<JsValue, JsValue> {
    let info = crate::info(data).map_err(to_js_err)?;
    serde_wasm_bindgen::to_value(&info).map_err(to_js_err)
}

/// channel `index`'s padded stream, or null if out of range
#[wasm_bindgen]
pub fn get_channel_stream(data: &[u8], index: usize) -> Result<JsValue, JsValue> {
    let container = Reader::new().read(data).map_err(to_js_err)?;
    let mut streams = crate::deinterleave(
        &container.payload,
        container.header.channel_count as usize,
        container.header.chunk_size as usize,
    )
    .map_err(to_js_err)?;

    if index >= streams.len() {
        return Ok(JsValue::NULL);
    }
    Ok(js_sys::Uint8Array::from(&streams.swap_remove(index)[..]).into())
}

#[wasm_bindgen]
pub fn validate_dmdfpwm(data: &[u8]) -> bool {
    crate::validate(data)
}
