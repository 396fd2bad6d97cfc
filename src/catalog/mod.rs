//! Course catalog aggregation
//!
//! The upstream publishes one bulk course dump per game. This module
//! cross-references its courses, chapters and videos so the front-end can
//! list videos by course without walking the dump itself.

pub mod aggregator;
pub mod client;

pub use aggregator::aggregate;
pub use client::CatalogClient;

use crate::error::RelayError;
use serde::{Deserialize, Serialize};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Games with a published course dump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Game {
    Valorant,
    Lol,
}

impl Game {
    pub fn as_str(&self) -> &'static str {
        match self {
            Game::Valorant => "valorant",
            Game::Lol => "lol",
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Game {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "valorant" => Ok(Game::Valorant),
            "lol" => Ok(Game::Lol),
            other => Err(RelayError::InvalidGame(other.to_string())),
        }
    }
}

/// A video as listed in the dump. Fields other than `uuid` pass through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub uuid: String,

    #[serde(rename = "courseName", default, skip_serializing_if = "Option::is_none")]
    pub course_name: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reference to a video from inside a chapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRef {
    pub uuid: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    #[serde(default)]
    pub vids: Vec<VideoRef>,

    #[serde(default)]
    pub chapters: Vec<Chapter>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseContent {
    #[serde(default)]
    pub chapters: Vec<Chapter>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub title: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The bulk document as published upstream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseDump {
    #[serde(default)]
    pub courses: Vec<Course>,

    #[serde(default)]
    pub videos: Vec<Video>,

    #[serde(rename = "videosToCourses", default)]
    pub videos_to_courses: IndexMap<String, CourseContent>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A course with its videos and chapters attached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseView {
    #[serde(flatten)]
    pub course: Course,

    pub videos: Vec<Video>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapters: Option<Vec<Chapter>>,
}

/// The denormalized `/courses` response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedCatalog {
    pub courses: Vec<CourseView>,

    pub videos: Vec<Video>,

    #[serde(rename = "videosToCourses")]
    pub videos_to_courses: IndexMap<String, CourseContent>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of the champion list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Champion {
    pub name: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
