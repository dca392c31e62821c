use crate::{
    api::{admin, attendance, employee, leave_request, payroll, system},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter config
    fn build_limiter(requests_per_min: u32) -> GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap()
    }

    let login_limiter = build_limiter(config.rate_login_per_min);
    let protected_limiter = build_limiter(config.rate_protected_per_min);

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(Governor::new(&login_limiter))
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/logout")
                    .wrap(Governor::new(&login_limiter))
                    .route(web::post().to(handlers::logout)),
            ),
    );
    cfg.route("/schema", web::get().to(system::schema));
    cfg.route("/test", web::get().to(system::store_probe));

    // Protected routes
    cfg.service(
        web::scope("/admin")
            .wrap(from_fn(auth_middleware))
            .wrap(Governor::new(&protected_limiter))
            .service(
                web::resource("/users")
                    .route(web::post().to(admin::create_user))
                    .route(web::get().to(admin::list_users)),
            )
            .service(
                web::resource("/departments")
                    .route(web::post().to(admin::create_department))
                    .route(web::get().to(admin::list_departments)),
            ),
    );
    cfg.service(
        web::scope("/employee")
            .wrap(from_fn(auth_middleware))
            .wrap(Governor::new(&protected_limiter))
            .service(
                web::resource("/{user_id}")
                    .route(web::put().to(employee::update_employee))
                    .route(web::get().to(employee::get_employee)),
            ),
    );
    cfg.service(
        web::scope("/attendance")
            .wrap(from_fn(auth_middleware))
            .wrap(Governor::new(&protected_limiter))
            .service(
                web::resource("/{user_id}")
                    .route(web::post().to(attendance::mark_attendance))
                    .route(web::get().to(attendance::list_attendance)),
            ),
    );
    cfg.service(
        web::scope("/leaves")
            .wrap(from_fn(auth_middleware))
            .wrap(Governor::new(&protected_limiter))
            // /leaves/approve/{leave_id} must register ahead of /leaves/{user_id}
            .service(
                web::resource("/approve/{leave_id}")
                    .route(web::post().to(leave_request::approve_leave)),
            )
            .service(
                web::resource("/{user_id}")
                    .route(web::post().to(leave_request::apply_leave))
                    .route(web::get().to(leave_request::list_leaves)),
            ),
    );
    cfg.service(
        web::scope("/payroll")
            .wrap(from_fn(auth_middleware))
            .wrap(Governor::new(&protected_limiter))
            .service(
                web::resource("/generate/{user_id}")
                    .route(web::post().to(payroll::generate_payslip)),
            )
            .service(
                web::resource("/{user_id}").route(web::get().to(payroll::list_payslips)),
            ),
    );
}
