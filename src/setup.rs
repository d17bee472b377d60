use std::io::Result;
use std::net::{TcpListener, ToSocketAddrs};
use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};

use crate::api::{get_key, ApiState};
use crate::distribution::http::{handle_peer_request, HttpPool};
use crate::group::Group;

/// Starts the server answering other peers' requests.
///
/// Every path is routed to the pool, which rejects anything outside its base path.
pub fn start_peer_server<A>(pool: Arc<HttpPool>, addrs: A) -> Result<Server>
where
    A: ToSocketAddrs,
{
    start_peer_server_on(pool, TcpListener::bind(addrs)?)
}

pub fn start_peer_server_on(pool: Arc<HttpPool>, listener: TcpListener) -> Result<Server> {
    let pool = web::Data::from(pool);
    listener.set_nonblocking(true)?;

    let server = HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .default_service(web::to(handle_peer_request))
    })
    .listen(listener)?
    .run();

    Ok(server)
}

/// Starts the front-end server exposing `GET /api?key=<key>` for one group.
pub fn start_api_server<A>(group: Arc<Group>, addrs: A) -> Result<Server>
where
    A: ToSocketAddrs,
{
    start_api_server_on(group, TcpListener::bind(addrs)?)
}

pub fn start_api_server_on(group: Arc<Group>, listener: TcpListener) -> Result<Server> {
    let appstate = web::Data::new(ApiState::new(group));
    listener.set_nonblocking(true)?;

    let server = HttpServer::new(move || {
        App::new()
            .app_data(appstate.clone())
            .route("/api", web::get().to(get_key))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
