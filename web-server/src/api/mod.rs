// web-server/src/api/mod.rs
pub mod messages;
pub mod tasks;
pub mod users;

use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    // Task routes go first: `DELETE /delete_task_{id}` would otherwise be
    // captured by `DELETE /{user_id}`
    cfg.service(tasks::get_all_tasks)
        .service(tasks::create_task)
        .service(tasks::update_task)
        .service(tasks::delete_task)
        .service(messages::get_messages)
        .service(users::get_all_users)
        .service(users::get_me)
        .service(users::create_user)
        .service(users::log_in)
        .service(users::update_user)
        .service(users::delete_user);
}
