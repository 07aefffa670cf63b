use std::fmt::Write;

use actix_web::{get, http::header::ContentType, web, HttpResponse, Responder};

use crate::{
    constants::{ROBOTS_DISALLOW, SITEMAP_PAGES, START_TIME},
    AppState,
};

pub fn robots_body(site_base: &str) -> String {
    let mut body = String::from("User-agent: *\nAllow: /\n");
    for path in ROBOTS_DISALLOW {
        let _ = writeln!(body, "Disallow: {}", path);
    }
    let _ = write!(body, "\nSitemap: {}/sitemap.xml\n", site_base);
    body
}

pub fn sitemap_body(site_base: &str) -> String {
    let lastmod = START_TIME.format("%Y-%m-%d");

    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for (path, priority) in SITEMAP_PAGES {
        let loc = if *path == "/" {
            site_base.to_string()
        } else {
            format!("{}{}", site_base, path)
        };
        let _ = write!(
            xml,
            "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n    <changefreq>weekly</changefreq>\n    <priority>{:.1}</priority>\n  </url>\n",
            loc, lastmod, priority
        );
    }
    xml.push_str("</urlset>\n");
    xml
}

#[get("/robots.txt")]
pub async fn robots_txt(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body(robots_body(state.config.site_base()))
}

#[get("/sitemap.xml")]
pub async fn sitemap_xml(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok()
        .content_type("application/xml")
        .body(sitemap_body(state.config.site_base()))
}
