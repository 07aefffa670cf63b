use actix_web::web;

use crate::handlers::{
    home::home,
    seo::{robots_txt, sitemap_xml},
    system::health_check,
};

mod contact;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(home)
        .service(health_check)
        .service(robots_txt)
        .service(sitemap_xml);

    cfg.service(
        web::scope("/api")
            .configure(contact::config_routes)
    );
}
