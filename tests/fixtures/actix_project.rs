use actix_web::{delete, get, post, web, App, HttpResponse, HttpServer, Responder};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
struct Order {
    id: u32,
    total: f64,
}

/// Lists open orders.
#[get("/orders")]
async fn list_orders() -> impl Responder {
    HttpResponse::Ok().json(Vec::<Order>::new())
}

/// Places a new order.
#[post("/orders")]
async fn place_order(order: web::Json<Order>) -> impl Responder {
    HttpResponse::Created().json(order.into_inner())
}

#[get("/orders/{id}")]
async fn show_order(path: web::Path<u32>) -> impl Responder {
    HttpResponse::Ok().json(Order { id: path.into_inner(), total: 0.0 })
}

/// Cancels an order.
#[delete("/orders/{id}")]
async fn cancel_order(_path: web::Path<u32>) -> impl Responder {
    HttpResponse::NoContent().finish()
}

/// Reports liveness.
async fn health() -> impl Responder {
    HttpResponse::Ok().body("ok")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    HttpServer::new(|| {
        App::new()
            .route("/health", web::get().to(health))
            .service(
                web::scope("/api")
                    .service(list_orders)
                    .service(place_order)
                    .service(show_order)
                    .service(cancel_order),
            )
    })
    .bind(("127.0.0.1", 8080))?
    .run()
    .await
}
