use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::error::ApiError;
use crate::models::task::{MessageResponse, TaskCreate, TaskUpdate};
use crate::repository::tasks::TaskRepository;

#[post("/tasks")]
pub async fn create_task(
    repo: web::Data<TaskRepository>,
    payload: web::Json<TaskCreate>,
) -> Result<HttpResponse, ApiError> {
    let payload = payload.into_inner();
    payload.validate()?;
    let repo = repo.into_inner();
    let task = web::block(move || repo.create(payload)).await??;
    Ok(HttpResponse::Created().json(task))
}

#[get("/tasks")]
pub async fn get_tasks(repo: web::Data<TaskRepository>) -> Result<HttpResponse, ApiError> {
    let repo = repo.into_inner();
    let tasks = web::block(move || repo.get_all()).await??;
    Ok(HttpResponse::Ok().json(tasks))
}

#[get("/tasks/{id}")]
pub async fn get_task_by_id(
    repo: web::Data<TaskRepository>,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let repo = repo.into_inner();
    let task = web::block(move || repo.get(id)).await??;
    Ok(HttpResponse::Ok().json(task))
}

#[put("/tasks/{id}")]
pub async fn update_task_by_id(
    repo: web::Data<TaskRepository>,
    id: web::Path<i64>,
    payload: web::Json<TaskUpdate>,
) -> Result<HttpResponse, ApiError> {
    let payload = payload.into_inner();
    payload.validate()?;
    let id = id.into_inner();
    let repo = repo.into_inner();
    let task = web::block(move || repo.update(id, payload)).await??;
    Ok(HttpResponse::Ok().json(task))
}

#[delete("/tasks/{id}")]
pub async fn delete_task_by_id(
    repo: web::Data<TaskRepository>,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let repo = repo.into_inner();
    web::block(move || repo.delete(id)).await??;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "deleted".to_string(),
    }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(create_task)
        .service(get_tasks)
        .service(get_task_by_id)
        .service(update_task_by_id)
        .service(delete_task_by_id);
}
