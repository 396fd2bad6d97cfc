//! Pure cross-referencing of a course dump

use super::{AggregatedCatalog, CourseDump, CourseView, Video};
use std::collections::HashMap;

/// Annotate videos with their course and attach videos and chapters to courses.
///
/// Only the top-level chapters of each `videosToCourses` entry are walked.
/// Entries are walked in document order. When a video appears under several
/// courses the last one names it. A course takes its content from the first
/// entry whose title contains the course title.
pub fn aggregate(dump: CourseDump) -> AggregatedCatalog {
    let mut video_to_course: HashMap<&str, &str> = HashMap::new();
    for (course_title, content) in &dump.videos_to_courses {
        for chapter in &content.chapters {
            for vid in &chapter.vids {
                video_to_course.insert(vid.uuid.as_str(), course_title.as_str());
            }
        }
    }

    let videos: Vec<Video> = dump
        .videos
        .iter()
        .map(|video| Video {
            course_name: video_to_course.get(video.uuid.as_str()).map(|t| t.to_string()),
            ..video.clone()
        })
        .collect();

    let by_uuid: HashMap<&str, &Video> = videos.iter().map(|v| (v.uuid.as_str(), v)).collect();

    let courses = dump
        .courses
        .iter()
        .map(|course| {
            let content = dump
                .videos_to_courses
                .iter()
                .find(|(title, _)| title.contains(course.title.as_str()))
                .map(|(_, content)| content);

            let course_videos: Vec<Video> = content
                .map(|content| {
                    content
                        .chapters
                        .iter()
                        .flat_map(|chapter| chapter.vids.iter())
                        .filter_map(|vid| by_uuid.get(vid.uuid.as_str()).map(|v| (*v).clone()))
                        .collect()
                })
                .unwrap_or_default();

            CourseView {
                course: course.clone(),
                videos: course_videos,
                chapters: content.map(|content| content.chapters.clone()),
            }
        })
        .collect();

    AggregatedCatalog {
        courses,
        videos,
        videos_to_courses: dump.videos_to_courses,
        extra: dump.extra,
    }
}
