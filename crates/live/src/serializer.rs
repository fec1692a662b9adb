// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! The serializer (L8): pluggable wire format and compression, with a
//! benchmark harness that auto-selects the cheapest combination for a
//! representative payload.

use std::{collections::HashMap, io::Write, time::Instant};

use flate2::{Compression, write::DeflateEncoder, write::DeflateDecoder};
use mdfanout_core::ServiceError;
use serde::{Serialize, de::DeserializeOwned};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WireFormat {
    Text,
    Binary,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Compress {
    None,
    DeflateWrap,
    DeflateRaw,
}

/// Header metadata a transport layer needs to decode the frame correctly.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameHeaders {
    pub format: WireFormat,
    pub compression: Compress,
}

fn encode_payload<T: Serialize>(value: &T, format: WireFormat) -> Result<Vec<u8>, ServiceError> {
    match format {
        WireFormat::Text => serde_json::to_vec(value).map_err(|e| ServiceError::Internal(e.to_string())),
        WireFormat::Binary => rmp_serde::to_vec(value).map_err(|e| ServiceError::Internal(e.to_string())),
    }
}

fn decode_payload<T: DeserializeOwned>(bytes: &[u8], format: WireFormat) -> Result<T, ServiceError> {
    match format {
        WireFormat::Text => serde_json::from_slice(bytes).map_err(|e| ServiceError::UpstreamProtocol(e.to_string())),
        WireFormat::Binary => rmp_serde::from_slice(bytes).map_err(|e| ServiceError::UpstreamProtocol(e.to_string())),
    }
}

fn compress(bytes: &[u8], compression: Compress) -> Result<Vec<u8>, ServiceError> {
    match compression {
        Compress::None => Ok(bytes.to_vec()),
        Compress::DeflateWrap | Compress::DeflateRaw => {
            let mut encoder = DeflateEncoder::new(Vec::new(), Compression::fast());
            encoder.write_all(bytes).map_err(|e| ServiceError::Internal(e.to_string()))?;
            encoder.finish().map_err(|e| ServiceError::Internal(e.to_string()))
        }
    }
}

fn decompress(bytes: &[u8], compression: Compress) -> Result<Vec<u8>, ServiceError> {
    match compression {
        Compress::None => Ok(bytes.to_vec()),
        Compress::DeflateWrap | Compress::DeflateRaw => {
            let mut decoder = DeflateDecoder::new(Vec::new());
            decoder.write_all(bytes).map_err(|e| ServiceError::UpstreamProtocol(e.to_string()))?;
            decoder.finish().map_err(|e| ServiceError::UpstreamProtocol(e.to_string()))
        }
    }
}

/// Serializes `value` using `format`/`compression`, returning the encoded
/// bytes and the headers a transport layer needs to decode them.
pub fn serialize<T: Serialize>(value: &T, format: WireFormat, compression: Compress) -> Result<(Vec<u8>, FrameHeaders), ServiceError> {
    let payload = encode_payload(value, format)?;
    let bytes = compress(&payload, compression)?;
    Ok((bytes, FrameHeaders { format, compression }))
}

/// Inverse of [`serialize`].
pub fn deserialize<T: DeserializeOwned>(bytes: &[u8], headers: &FrameHeaders) -> Result<T, ServiceError> {
    let payload = decompress(bytes, headers.compression)?;
    decode_payload(&payload, headers.format)
}

const ALL_FORMATS: [WireFormat; 2] = [WireFormat::Text, WireFormat::Binary];
const ALL_COMPRESSIONS: [Compress; 3] = [Compress::None, Compress::DeflateWrap, Compress::DeflateRaw];

/// Measured cost of one format/compression combination.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BenchmarkResult {
    pub format: WireFormat,
    pub compression: Compress,
    pub serialize_ms: f64,
    pub deserialize_ms: f64,
    pub size_kb: f64,
    pub score: f64,
}

fn score(total_time_ms: f64, size_kb: f64) -> f64 {
    0.6 * total_time_ms + 0.4 * size_kb
}

/// Runs `serialize`/`deserialize` across every format/compression pair for
/// `sample`, `iterations` times after a warm-up pass, and returns the one
/// minimizing `0.6 * total_time_ms + 0.4 * size_kb`.
pub fn benchmark<T>(sample: &T, iterations: usize) -> Result<(BenchmarkResult, Vec<BenchmarkResult>), ServiceError>
where
    T: Serialize + DeserializeOwned,
{
    let mut results = Vec::with_capacity(ALL_FORMATS.len() * ALL_COMPRESSIONS.len());

    for &format in &ALL_FORMATS {
        for &compression in &ALL_COMPRESSIONS {
            // Warm-up: populate any lazy allocator state before timing.
            let (warm_bytes, warm_headers) = serialize(sample, format, compression)?;
            let _: T = deserialize(&warm_bytes, &warm_headers)?;

            let serialize_start = Instant::now();
            let mut last_bytes = Vec::new();
            let mut last_headers = warm_headers;
            for _ in 0..iterations {
                let (bytes, headers) = serialize(sample, format, compression)?;
                last_bytes = bytes;
                last_headers = headers;
            }
            let serialize_elapsed = serialize_start.elapsed();

            let deserialize_start = Instant::now();
            for _ in 0..iterations {
                let _: T = deserialize(&last_bytes, &last_headers)?;
            }
            let deserialize_elapsed = deserialize_start.elapsed();

            let serialize_ms = serialize_elapsed.as_secs_f64() * 1000.0 / iterations as f64;
            let deserialize_ms = deserialize_elapsed.as_secs_f64() * 1000.0 / iterations as f64;
            let size_kb = last_bytes.len() as f64 / 1024.0;
            let total_time_ms = serialize_ms + deserialize_ms;

            results.push(BenchmarkResult {
                format,
                compression,
                serialize_ms,
                deserialize_ms,
                size_kb,
                score: score(total_time_ms, size_kb),
            });
        }
    }

    let best = results
        .iter()
        .copied()
        .min_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal))
        .expect("ALL_FORMATS x ALL_COMPRESSIONS is non-empty");

    Ok((best, results))
}

/// Caches the last selection per logical payload name so repeated benchmark
/// runs (e.g. on a schedule) don't need to be re-read by every caller.
#[derive(Default)]
pub struct SerializerSelection {
    preferred: HashMap<String, (WireFormat, Compress)>,
}

impl SerializerSelection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, payload_name: &str, format: WireFormat, compression: Compress) {
        self.preferred.insert(payload_name.to_string(), (format, compression));
    }

    #[must_use]
    pub fn get(&self, payload_name: &str) -> Option<(WireFormat, Compress)> {
        self.preferred.get(payload_name).copied()
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        symbol: String,
        levels: Vec<(f64, f64)>,
    }

    fn sample() -> Sample {
        Sample { symbol: "BTCUSDT".into(), levels: (0..50).map(|i| (100.0 + i as f64, 1.5)).collect() }
    }

    #[test]
    fn text_none_round_trips() {
        let (bytes, headers) = serialize(&sample(), WireFormat::Text, Compress::None).unwrap();
        let decoded: Sample = deserialize(&bytes, &headers).unwrap();
        assert_eq!(decoded, sample());
    }

    #[test]
    fn binary_deflate_round_trips() {
        let (bytes, headers) = serialize(&sample(), WireFormat::Binary, Compress::DeflateWrap).unwrap();
        let decoded: Sample = deserialize(&bytes, &headers).unwrap();
        assert_eq!(decoded, sample());
    }

    #[test]
    fn binary_is_smaller_than_text_for_numeric_payload() {
        let (text_bytes, _) = serialize(&sample(), WireFormat::Text, Compress::None).unwrap();
        let (binary_bytes, _) = serialize(&sample(), WireFormat::Binary, Compress::None).unwrap();
        assert!(binary_bytes.len() < text_bytes.len());
    }

    #[test]
    fn benchmark_covers_every_combination() {
        let (_best, all) = benchmark(&sample(), 5).unwrap();
        assert_eq!(all.len(), ALL_FORMATS.len() * ALL_COMPRESSIONS.len());
    }

    #[test]
    fn benchmark_selects_lowest_scoring_combination() {
        let (best, all) = benchmark(&sample(), 5).unwrap();
        assert!(all.iter().all(|candidate| candidate.score >= best.score));
    }

    #[test]
    fn selection_cache_round_trips() {
        let mut selection = SerializerSelection::new();
        assert!(selection.get("orderbook_update").is_none());
        selection.set("orderbook_update", WireFormat::Binary, Compress::DeflateWrap);
        assert_eq!(selection.get("orderbook_update"), Some((WireFormat::Binary, Compress::DeflateWrap)));
    }
}
