//! Reading of the event description file.

use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use std::fs;

use quadratic_voting::{AnalyticsConfig, EventOption, OptionSource};

use crate::analytics::{OpeningJsonSnafu, ParsingJsonSnafu, QvResult};

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct EventConfig {
    #[serde(rename = "eventId")]
    pub event_id: String,
    pub title: Option<String>,
    pub options: Vec<OptionConfig>,
    pub canvas: Option<CanvasConfig>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OptionConfig {
    pub id: String,
    pub title: String,
    pub position: Option<u32>,
    /// "admin" (default) or "community".
    pub source: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CanvasConfig {
    pub width: f64,
    pub height: f64,
}

pub fn read_event_config(path: &str) -> QvResult<EventConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu {
        path: path.to_string(),
    })?;
    let config: EventConfig = serde_json::from_str(&contents).context(ParsingJsonSnafu {})?;
    Ok(config)
}

/// Validates the option descriptions and orders them by display position.
pub fn event_options(config: &EventConfig) -> QvResult<Vec<EventOption>> {
    let mut options: Vec<EventOption> = Vec::with_capacity(config.options.len());
    for (idx, oc) in config.options.iter().enumerate() {
        let source = match oc.source.as_deref() {
            None | Some("admin") => OptionSource::Admin,
            Some("community") => OptionSource::Community,
            Some(x) => {
                whatever!("Unknown option source {:?} for option {}", x, oc.id)
            }
        };
        options.push(EventOption {
            id: oc.id.clone(),
            event_id: config.event_id.clone(),
            title: oc.title.clone(),
            position: oc.position.unwrap_or(idx as u32),
            source,
        });
    }
    options.sort_by_key(|o| o.position);
    Ok(options)
}

pub fn analytics_config(config: &EventConfig) -> AnalyticsConfig {
    match &config.canvas {
        Some(canvas) => AnalyticsConfig {
            width: canvas.width,
            height: canvas.height,
        },
        None => AnalyticsConfig::DEFAULT,
    }
}
