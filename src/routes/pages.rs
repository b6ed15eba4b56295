use std::{path::Path, sync::Arc};

use axum::Router;
use tower_http::services::ServeFile;

use crate::AppState;

/// Page route and the HTML file behind it, relative to `<static_dir>/scoreboard`
const PAGES: &[(&str, &str)] = &[
    ("/admin", "admin.html"),
    ("/app/newlywed/scoreboard", "scoreboard.html"),
    ("/app/newlywed/contestant", "contestant.html"),
    ("/app/newlywed/questions", "questions.html"),
];

pub fn page_routes(static_dir: &str) -> Router<Arc<AppState>> {
    let pages_dir = Path::new(static_dir).join("scoreboard");

    PAGES.iter().fold(Router::new(), |router, (route, file)| {
        router.route_service(route, ServeFile::new(pages_dir.join(file)))
    })
}
