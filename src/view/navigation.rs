//! Hash-route matching for the tracker's screens.

use crate::models::Category;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    JobList,
    FileView { project_no: String },
    PanelSlab,
    Cutting,
    Door,
    StripCurtain,
    Accessories,
    System,
    Admin,
}

impl Route {
    /// Match a location hash (`#/files/17408`, `/doors`, ...). Anything
    /// unrecognised lands on the job list.
    pub fn parse(hash: &str) -> Route {
        let path = hash.trim().trim_start_matches('#');
        let path = path.trim_end_matches('/');
        let path = if path.is_empty() { "/" } else { path };

        if let Some(project_no) = path.strip_prefix("/files/") {
            if !project_no.is_empty() {
                return Route::FileView {
                    project_no: project_no.to_string(),
                };
            }
        }

        match path {
            "/panels" => Route::PanelSlab,
            "/cutting" => Route::Cutting,
            "/doors" => Route::Door,
            "/strip-curtain" => Route::StripCurtain,
            "/accessories" => Route::Accessories,
            "/system" => Route::System,
            "/admin" => Route::Admin,
            _ => Route::JobList,
        }
    }

    pub fn to_hash(&self) -> String {
        match self {
            Route::JobList => "/".into(),
            Route::FileView { project_no } => format!("/files/{}", project_no),
            Route::PanelSlab => "/panels".into(),
            Route::Cutting => "/cutting".into(),
            Route::Door => "/doors".into(),
            Route::StripCurtain => "/strip-curtain".into(),
            Route::Accessories => "/accessories".into(),
            Route::System => "/system".into(),
            Route::Admin => "/admin".into(),
        }
    }

    /// Stage whose task board this route shows.
    pub fn task_category(&self) -> Option<Category> {
        match self {
            Route::PanelSlab => Some(Category::Panel),
            Route::Cutting => Some(Category::Cutting),
            Route::Door => Some(Category::Door),
            Route::StripCurtain => Some(Category::StripCurtain),
            Route::Accessories => Some(Category::Accessories),
            Route::System => Some(Category::System),
            Route::JobList | Route::FileView { .. } | Route::Admin => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hash())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_known_routes() {
        assert_eq!(
            Route::parse("#/files/17408"),
            Route::FileView {
                project_no: "17408".into()
            }
        );
        assert_eq!(Route::parse("/doors"), Route::Door);
        assert_eq!(Route::parse("#/panels/"), Route::PanelSlab);
        assert_eq!(Route::parse("#/admin"), Route::Admin);
    }

    #[test]
    fn unknown_and_empty_hashes_fall_back_to_job_list() {
        assert_eq!(Route::parse(""), Route::JobList);
        assert_eq!(Route::parse("#"), Route::JobList);
        assert_eq!(Route::parse("#/files/"), Route::JobList);
        assert_eq!(Route::parse("#/nowhere"), Route::JobList);
    }

    #[test]
    fn to_hash_parses_back_to_the_same_route() {
        let routes = [
            Route::JobList,
            Route::FileView {
                project_no: "A-12".into(),
            },
            Route::Cutting,
            Route::StripCurtain,
            Route::System,
        ];
        for route in routes {
            assert_eq!(Route::parse(&route.to_hash()), route);
        }
    }

    #[test]
    fn stage_routes_map_to_task_categories() {
        assert_eq!(Route::Door.task_category(), Some(Category::Door));
        assert_eq!(Route::JobList.task_category(), None);
    }
}
