// web-server/src/api/tasks.rs
use actix_web::{delete, get, post, put, web, HttpResponse};
use common::models::{Task, TaskInput};
use common::now;
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TaskFilter {
    pub user_id: Option<String>,
}

#[get("/all_tasks")]
pub async fn get_all_tasks(
    _auth: AuthenticatedUser,
    state: web::Data<AppState>,
    query: web::Query<TaskFilter>,
) -> Result<HttpResponse, ApiError> {
    let tasks = match query.into_inner().user_id {
        Some(owner) => state.tasks.find_many(&|task: &Task| task.user_id == owner).await?,
        None => state.tasks.find_all().await?,
    };

    Ok(HttpResponse::Ok().json(tasks))
}

#[post("/create_task")]
pub async fn create_task(
    auth: AuthenticatedUser,
    state: web::Data<AppState>,
    body: web::Json<TaskInput>,
) -> Result<HttpResponse, ApiError> {
    let task = Task::new(body.into_inner(), auth.user_id, now());
    let id = state.tasks.insert(task).await?;

    tracing::info!("Created task {}", id);
    Ok(HttpResponse::Ok().json(json!({
        "status_code": 200,
        "id": id
    })))
}

#[put("/update_task/{task_id}")]
pub async fn update_task(
    _auth: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<TaskInput>,
) -> Result<HttpResponse, ApiError> {
    let task_id = path.into_inner();
    tracing::info!("Updating task {}", task_id);

    let mut record = state
        .tasks
        .find_by_id(&task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task does not exist".to_string()))?;

    record.doc.apply(body.into_inner(), now());

    if !state.tasks.update(&task_id, record.doc).await? {
        return Err(ApiError::NotFound("Task update failed".to_string()));
    }

    Ok(HttpResponse::Ok().json(json!({
        "status_code": 200,
        "message": "Task Updated Successfully"
    })))
}

#[delete("/delete_task_{task_id}")]
pub async fn delete_task(
    _auth: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let task_id = path.into_inner();

    if !state.tasks.delete(&task_id).await? {
        return Err(ApiError::NotFound("Task does not exist".to_string()));
    }

    Ok(HttpResponse::Ok().json(json!({
        "status_code": 200,
        "message": "Task Deleted Successfully"
    })))
}
