// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process Connexa backend for integration tests.
//!
//! Serves the REST API from memory on a random local port. Tokens are HS256
//! JWTs signed with [`SIGNING_KEY`]; every request is recorded so tests can
//! assert on what the client actually sent.

#![allow(dead_code)]

use axum::{
    extract::{FromRequestParts, Path, Query, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post, put},
    Json, Router,
};
use connexa_client::config::Config;
use connexa_client::models::UserProfile;
use connexa_client::session::{MemoryStorage, Session};
use connexa_client::Connexa;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::task::JoinHandle;

pub const SIGNING_KEY: &[u8] = b"connexa-test-signing-key";
pub const RESET_TOKEN: &str = "reset-token-123";

type ApiError = (StatusCode, Json<Value>);
type ApiResult = Result<Json<Value>, ApiError>;
type Created = Result<(StatusCode, Json<Value>), ApiError>;

fn fail(status: StatusCode, message: &str) -> ApiError {
    (status, Json(json!({ "message": message })))
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
    iat: usize,
}

/// Create a JWT for a user, as the login endpoint does.
pub fn create_jwt(user_id: u64) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        exp: now + 86400,
        iat: now,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SIGNING_KEY),
    )
    .unwrap()
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
}

impl RecordedRequest {
    /// Query parameters in the order they were sent.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query
            .as_deref()
            .unwrap_or("")
            .split('&')
            .filter(|p| !p.is_empty())
            .map(|p| {
                let (k, v) = p.split_once('=').unwrap_or((p, ""));
                (
                    urlencoding::decode(k).unwrap().into_owned(),
                    urlencoding::decode(&v.replace('+', " ")).unwrap().into_owned(),
                )
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: u64,
    pub nome: String,
    pub email: String,
    pub senha: String,
    pub curso: Option<String>,
    pub periodo: Option<String>,
    pub interesses: Option<String>,
    pub avatar: Option<String>,
}

impl UserRow {
    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "nome": self.nome,
            "email": self.email,
            "curso": self.curso,
            "periodo": self.periodo,
            "interesses": self.interesses,
            "avatar": self.avatar,
        })
    }
}

#[derive(Debug, Clone)]
pub struct GroupRow {
    pub id: u64,
    pub nome: String,
    pub materia: String,
    pub objetivo: String,
    pub local: String,
    pub limite: u32,
    pub criador_id: u64,
    /// (user id, role)
    pub members: Vec<(u64, &'static str)>,
}

impl GroupRow {
    fn is_member(&self, user_id: u64) -> bool {
        self.members.iter().any(|(id, _)| *id == user_id)
    }
}

#[derive(Debug, Clone)]
pub struct MessageRow {
    pub id: u64,
    pub grupo_id: u64,
    pub usuario_id: u64,
    pub conteudo: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NotificationRow {
    pub id: u64,
    pub usuario_id: u64,
    pub tipo: &'static str,
    pub titulo: String,
    pub conteudo: String,
    pub lida: bool,
    pub grupo_id: Option<u64>,
}

impl NotificationRow {
    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "usuario_id": self.usuario_id,
            "tipo": self.tipo,
            "titulo": self.titulo,
            "conteudo": self.conteudo,
            "lida": self.lida,
            "grupo_id": self.grupo_id,
        })
    }
}

#[derive(Debug, Default)]
pub struct Db {
    next_id: u64,
    pub users: Vec<UserRow>,
    pub groups: Vec<GroupRow>,
    pub messages: Vec<MessageRow>,
    pub notifications: Vec<NotificationRow>,
}

impl Db {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn user(&self, id: u64) -> Option<&UserRow> {
        self.users.iter().find(|u| u.id == id)
    }

    fn group_json(&self, group: &GroupRow) -> Value {
        json!({
            "id": group.id,
            "nome": group.nome,
            "materia": group.materia,
            "objetivo": group.objetivo,
            "local": group.local,
            "participantes_atual": group.members.len(),
            "limite_participantes": group.limite,
            "criador_id": group.criador_id,
            "criador_nome": self.user(group.criador_id).map(|u| u.nome.clone()),
            "created_at": "2026-10-01T12:00:00Z",
        })
    }

    fn participants_json(&self, group: &GroupRow) -> Vec<Value> {
        group
            .members
            .iter()
            .filter_map(|(id, role)| {
                self.user(*id).map(|u| {
                    json!({
                        "id": u.id,
                        "nome": u.nome,
                        "curso": u.curso,
                        "periodo": u.periodo,
                        "avatar": u.avatar,
                        "papel": role,
                    })
                })
            })
            .collect()
    }

    fn message_json(&self, message: &MessageRow) -> Value {
        json!({
            "id": message.id,
            "grupo_id": message.grupo_id,
            "usuario_id": message.usuario_id,
            "usuario_nome": self.user(message.usuario_id).map(|u| u.nome.clone()),
            "conteudo": message.conteudo,
            "created_at": message.created_at,
        })
    }

    fn notify_members(&mut self, group_id: u64, except: u64, tipo: &'static str, titulo: &str) {
        let Some(group) = self.groups.iter().find(|g| g.id == group_id) else {
            return;
        };
        let recipients: Vec<u64> = group
            .members
            .iter()
            .map(|(id, _)| *id)
            .filter(|id| *id != except)
            .collect();
        let nome = group.nome.clone();
        for usuario_id in recipients {
            let id = self.next_id();
            self.notifications.push(NotificationRow {
                id,
                usuario_id,
                tipo,
                titulo: titulo.to_string(),
                conteudo: format!("Atividade no grupo {}", nome),
                lida: false,
                grupo_id: Some(group_id),
            });
        }
    }
}

/// Shared state of the mock backend.
#[derive(Debug, Default)]
pub struct MockBackend {
    db: Mutex<Db>,
    requests: Mutex<Vec<RecordedRequest>>,
    login_unauthorized: AtomicBool,
}

impl MockBackend {
    pub fn with_db<R>(&self, f: impl FnOnce(&mut Db) -> R) -> R {
        f(&mut self.db.lock().unwrap())
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Most recent request to `path` (relative to `/api`).
    pub fn last_request(&self, path: &str) -> Option<RecordedRequest> {
        self.requests()
            .into_iter()
            .rev()
            .find(|r| r.path == path)
    }

    /// Answer bad credentials with 401 instead of 400.
    pub fn reject_logins_with_401(&self) {
        self.login_unauthorized.store(true, Ordering::SeqCst);
    }

    pub fn add_user(&self, nome: &str, email: &str, senha: &str) -> u64 {
        self.with_db(|db| {
            let id = db.next_id();
            db.users.push(UserRow {
                id,
                nome: nome.to_string(),
                email: email.to_string(),
                senha: senha.to_string(),
                curso: Some("Engenharia de Computação".to_string()),
                periodo: Some("3º".to_string()),
                interesses: None,
                avatar: Some("avatar-1".to_string()),
            });
            id
        })
    }

    pub fn add_group(&self, creator: u64, nome: &str, materia: &str, local: &str, limite: u32) -> u64 {
        self.with_db(|db| {
            let id = db.next_id();
            db.groups.push(GroupRow {
                id,
                nome: nome.to_string(),
                materia: materia.to_string(),
                objetivo: "Resolver listas de exercícios juntos".to_string(),
                local: local.to_string(),
                limite,
                criador_id: creator,
                members: vec![(creator, "admin")],
            });
            id
        })
    }

    pub fn add_member(&self, group_id: u64, user_id: u64) {
        self.with_db(|db| {
            if let Some(group) = db.groups.iter_mut().find(|g| g.id == group_id) {
                group.members.push((user_id, "membro"));
            }
        })
    }

    pub fn add_notification(&self, user_id: u64, tipo: &'static str, lida: bool) -> u64 {
        self.with_db(|db| {
            let id = db.next_id();
            db.notifications.push(NotificationRow {
                id,
                usuario_id: user_id,
                tipo,
                titulo: "Aviso".to_string(),
                conteudo: "Algo aconteceu".to_string(),
                lida,
                grupo_id: None,
            });
            id
        })
    }

    pub fn profile(&self, user_id: u64) -> UserProfile {
        self.with_db(|db| serde_json::from_value(db.user(user_id).unwrap().to_json()).unwrap())
    }
}

/// Running mock server; aborted on drop.
pub struct TestServer {
    pub url: String,
    pub backend: Arc<MockBackend>,
    handle: JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl TestServer {
    /// Client with an empty in-memory session.
    pub fn client(&self) -> Connexa {
        Connexa::new(
            Config::with_api_url(&self.url),
            Arc::new(MemoryStorage::new()),
        )
        .unwrap()
    }

    /// Client already holding a valid session for `user_id`.
    pub fn client_for(&self, user_id: u64) -> Connexa {
        let client = self.client();
        client
            .session
            .establish(&Session {
                token: create_jwt(user_id),
                user: self.backend.profile(user_id),
            })
            .unwrap();
        client
    }
}

/// Start the mock backend on a random local port.
pub async fn spawn_backend() -> TestServer {
    let backend = Arc::new(MockBackend::default());
    let app = create_router(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        url: format!("http://{}/api", addr),
        backend,
        handle,
    }
}

fn create_router(backend: Arc<MockBackend>) -> Router {
    let api = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/verify-token", get(verify_token))
        .route("/auth/reset-password", post(reset_password))
        .route("/auth/confirm-reset-password", post(confirm_reset_password))
        .route("/usuarios/cadastro", post(register))
        .route("/usuarios/perfil", get(get_profile).put(update_profile))
        .route("/usuarios/grupos", get(my_groups))
        .route("/usuarios/avatares", get(avatars))
        .route("/usuarios/conta", delete(delete_account))
        .route("/grupos", post(create_group))
        .route("/grupos/buscar", get(search_groups))
        .route("/grupos/{id}", get(get_group).delete(delete_group))
        .route("/grupos/{id}/entrar", post(join_group))
        .route("/grupos/{id}/sair", delete(leave_group))
        .route("/grupos/{id}/participantes", get(participants))
        .route("/grupos/{id}/mensagens", get(list_messages).post(send_message))
        .route("/grupos/{id}/mensagens/ultimas", get(latest_messages))
        .route("/grupos/{id}/mensagens/{mid}", delete(delete_message))
        .route("/notificacoes", get(list_notifications))
        .route("/notificacoes/estatisticas", get(notification_stats))
        .route("/notificacoes/marcar-todas-lidas", put(mark_all_read))
        .route("/notificacoes/limpar-todas", delete(clear_notifications))
        .route("/notificacoes/por-tipo/{tipo}", get(notifications_by_type))
        .route("/notificacoes/{id}", delete(delete_notification))
        .route("/notificacoes/{id}/lida", put(mark_read));

    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(backend.clone(), record))
        .with_state(backend)
}

async fn record(State(backend): State<Arc<MockBackend>>, request: Request, next: Next) -> Response {
    let path = request.uri().path();
    backend.requests.lock().unwrap().push(RecordedRequest {
        method: request.method().to_string(),
        path: path.strip_prefix("/api").unwrap_or(path).to_string(),
        query: request.uri().query().map(str::to_string),
    });
    next.run(request).await
}

/// Caller identified by a valid bearer token.
struct AuthUser(u64);

impl FromRequestParts<Arc<MockBackend>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        backend: &Arc<MockBackend>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "Token não fornecido"))?;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(SIGNING_KEY),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|_| fail(StatusCode::UNAUTHORIZED, "Token inválido"))?;

        let id: u64 = data
            .claims
            .sub
            .parse()
            .map_err(|_| fail(StatusCode::UNAUTHORIZED, "Token inválido"))?;

        if backend.with_db(|db| db.user(id).is_none()) {
            return Err(fail(StatusCode::UNAUTHORIZED, "Usuário não encontrado"));
        }
        Ok(AuthUser(id))
    }
}

fn str_field<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key).and_then(Value::as_str)
}

fn page_params(params: &HashMap<String, String>, default_limit: u32) -> (u32, u32) {
    let page = params
        .get("pagina")
        .and_then(|p| p.parse().ok())
        .filter(|p| *p > 0)
        .unwrap_or(1);
    let limit = params
        .get("limite")
        .and_then(|p| p.parse().ok())
        .filter(|p| *p > 0)
        .unwrap_or(default_limit);
    (page, limit)
}

fn paginate<T: Clone>(items: &[T], page: u32, limit: u32) -> (Vec<T>, Value) {
    let total = items.len() as u32;
    let pages = total.div_ceil(limit);
    let start = ((page - 1) * limit) as usize;
    let slice = items.iter().skip(start).take(limit as usize).cloned().collect();
    (
        slice,
        json!({ "pagina": page, "limite": limit, "total": total, "total_paginas": pages }),
    )
}

// Auth

async fn login(State(backend): State<Arc<MockBackend>>, Json(body): Json<Value>) -> ApiResult {
    let email = str_field(&body, "email").unwrap_or_default();
    let senha = str_field(&body, "senha").unwrap_or_default();
    let status = if backend.login_unauthorized.load(Ordering::SeqCst) {
        StatusCode::UNAUTHORIZED
    } else {
        StatusCode::BAD_REQUEST
    };

    backend.with_db(|db| -> ApiResult {
        let user = db
            .users
            .iter()
            .find(|u| u.email == email && u.senha == senha)
            .ok_or_else(|| fail(status, "Email ou senha incorretos"))?;
        Ok(Json(json!({ "token": create_jwt(user.id), "usuario": user.to_json() })))
    })
}

async fn register(
    State(backend): State<Arc<MockBackend>>,
    Json(body): Json<Value>,
) -> Created {
    let email = str_field(&body, "email").unwrap_or_default().to_string();
    if backend.with_db(|db| db.users.iter().any(|u| u.email == email)) {
        return Err(fail(StatusCode::BAD_REQUEST, "Email já cadastrado"));
    }

    let id = backend.add_user(
        str_field(&body, "nome").unwrap_or_default(),
        &email,
        str_field(&body, "senha").unwrap_or_default(),
    );
    backend.with_db(|db| -> Created {
        let user = db.users.iter_mut().find(|u| u.id == id).unwrap();
        user.curso = str_field(&body, "curso").map(str::to_string);
        user.periodo = str_field(&body, "periodo").map(str::to_string);
        user.interesses = str_field(&body, "interesses").map(str::to_string);
        user.avatar = str_field(&body, "avatar").map(str::to_string);
        Ok((
            StatusCode::CREATED,
            Json(json!({ "token": create_jwt(id), "usuario": user.to_json() })),
        ))
    })
}

async fn verify_token(State(backend): State<Arc<MockBackend>>, AuthUser(id): AuthUser) -> ApiResult {
    backend.with_db(|db| -> ApiResult {
        Ok(Json(json!({ "valid": true, "usuario": db.user(id).map(UserRow::to_json) })))
    })
}

async fn reset_password(Json(body): Json<Value>) -> ApiResult {
    if str_field(&body, "email").unwrap_or_default().is_empty() {
        return Err(fail(StatusCode::BAD_REQUEST, "Email é obrigatório"));
    }
    Ok(Json(json!({ "message": "Se o email existir, você receberá instruções" })))
}

async fn confirm_reset_password(Json(body): Json<Value>) -> ApiResult {
    if str_field(&body, "token") != Some(RESET_TOKEN) {
        return Err(fail(StatusCode::BAD_REQUEST, "Token inválido ou expirado"));
    }
    Ok(Json(json!({ "message": "Senha alterada com sucesso" })))
}

// Users

async fn get_profile(State(backend): State<Arc<MockBackend>>, AuthUser(id): AuthUser) -> ApiResult {
    backend.with_db(|db| Ok(Json(json!({ "usuario": db.user(id).map(UserRow::to_json) }))))
}

async fn update_profile(
    State(backend): State<Arc<MockBackend>>,
    AuthUser(id): AuthUser,
    Json(body): Json<Value>,
) -> ApiResult {
    backend.with_db(|db| -> ApiResult {
        let user = db.users.iter_mut().find(|u| u.id == id).unwrap();
        if let Some(nome) = str_field(&body, "nome") {
            user.nome = nome.to_string();
        }
        if let Some(curso) = str_field(&body, "curso") {
            user.curso = Some(curso.to_string());
        }
        if let Some(periodo) = str_field(&body, "periodo") {
            user.periodo = Some(periodo.to_string());
        }
        if let Some(interesses) = str_field(&body, "interesses") {
            user.interesses = Some(interesses.to_string());
        }
        if let Some(avatar) = str_field(&body, "avatar") {
            user.avatar = Some(avatar.to_string());
        }
        Ok(Json(json!({ "message": "Perfil atualizado", "usuario": user.to_json() })))
    })
}

async fn my_groups(State(backend): State<Arc<MockBackend>>, AuthUser(id): AuthUser) -> ApiResult {
    backend.with_db(|db| -> ApiResult {
        let groups: Vec<Value> = db
            .groups
            .iter()
            .filter(|g| g.is_member(id))
            .map(|g| db.group_json(g))
            .collect();
        Ok(Json(json!({ "grupos": groups })))
    })
}

async fn avatars(AuthUser(_): AuthUser) -> ApiResult {
    Ok(Json(json!({
        "avatares": [
            { "id": "avatar-1", "emoji": "🦊", "nome": "Raposa", "cor": "#f97316" },
            { "id": "avatar-2", "emoji": "🐼", "nome": "Panda", "cor": "#64748b" },
            { "id": "avatar-3", "emoji": "🦉", "nome": "Coruja", "cor": "#a16207" },
        ]
    })))
}

async fn delete_account(
    State(backend): State<Arc<MockBackend>>,
    AuthUser(id): AuthUser,
    Json(body): Json<Value>,
) -> ApiResult {
    backend.with_db(|db| -> ApiResult {
        let senha = str_field(&body, "senha").unwrap_or_default();
        if db.user(id).map(|u| u.senha.as_str()) != Some(senha) {
            return Err(fail(StatusCode::BAD_REQUEST, "Senha incorreta"));
        }
        db.users.retain(|u| u.id != id);
        for group in &mut db.groups {
            group.members.retain(|(member, _)| *member != id);
        }
        db.notifications.retain(|n| n.usuario_id != id);
        Ok(Json(json!({ "message": "Conta excluída" })))
    })
}

// Groups

async fn create_group(
    State(backend): State<Arc<MockBackend>>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<Value>,
) -> Created {
    let nome = str_field(&body, "nome").unwrap_or_default();
    if nome.trim().is_empty() {
        return Err(fail(StatusCode::BAD_REQUEST, "Nome do grupo é obrigatório"));
    }

    let limite = body
        .get("limite_participantes")
        .and_then(Value::as_u64)
        .unwrap_or(10) as u32;
    let id = backend.add_group(
        user_id,
        nome,
        str_field(&body, "materia").unwrap_or_default(),
        str_field(&body, "local").unwrap_or("presencial"),
        limite,
    );

    backend.with_db(|db| -> Created {
        let group = db.groups.iter_mut().find(|g| g.id == id).unwrap();
        group.objetivo = str_field(&body, "objetivo").unwrap_or_default().to_string();
        let group = group.clone();
        Ok((StatusCode::CREATED, Json(json!({ "grupo": db.group_json(&group) }))))
    })
}

async fn search_groups(
    State(backend): State<Arc<MockBackend>>,
    AuthUser(_): AuthUser,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    let (page, limit) = page_params(&params, 10);

    backend.with_db(|db| -> ApiResult {
        let matches: Vec<GroupRow> = db
            .groups
            .iter()
            .filter(|g| {
                params
                    .get("materia")
                    .map_or(true, |m| g.materia.to_lowercase().contains(&m.to_lowercase()))
            })
            .filter(|g| params.get("local").map_or(true, |l| g.local == *l))
            .filter(|g| {
                params.get("texto").map_or(true, |t| {
                    let t = t.to_lowercase();
                    g.nome.to_lowercase().contains(&t) || g.objetivo.to_lowercase().contains(&t)
                })
            })
            .cloned()
            .collect();

        let (slice, paginacao) = paginate(&matches, page, limit);
        let grupos: Vec<Value> = slice.iter().map(|g| db.group_json(g)).collect();
        Ok(Json(json!({ "grupos": grupos, "paginacao": paginacao })))
    })
}

async fn get_group(
    State(backend): State<Arc<MockBackend>>,
    AuthUser(_): AuthUser,
    Path(id): Path<u64>,
) -> ApiResult {
    backend.with_db(|db| -> ApiResult {
        let group = db
            .groups
            .iter()
            .find(|g| g.id == id)
            .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Grupo não encontrado"))?;
        Ok(Json(json!({
            "grupo": db.group_json(group),
            "participantes": db.participants_json(group),
        })))
    })
}

async fn join_group(
    State(backend): State<Arc<MockBackend>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<u64>,
) -> ApiResult {
    backend.with_db(|db| -> ApiResult {
        let group = db
            .groups
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Grupo não encontrado"))?;
        if group.is_member(user_id) {
            return Err(fail(StatusCode::BAD_REQUEST, "Você já é membro deste grupo"));
        }
        if group.members.len() as u32 >= group.limite {
            return Err(fail(StatusCode::BAD_REQUEST, "Grupo está lotado"));
        }
        group.members.push((user_id, "membro"));
        db.notify_members(id, user_id, "novo_membro", "Novo membro");
        Ok(Json(json!({ "message": "Você entrou no grupo" })))
    })
}

async fn leave_group(
    State(backend): State<Arc<MockBackend>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<u64>,
) -> ApiResult {
    backend.with_db(|db| -> ApiResult {
        let group = db
            .groups
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Grupo não encontrado"))?;
        if !group.is_member(user_id) {
            return Err(fail(StatusCode::BAD_REQUEST, "Você não é membro deste grupo"));
        }
        group.members.retain(|(member, _)| *member != user_id);
        Ok(Json(json!({ "message": "Você saiu do grupo" })))
    })
}

async fn delete_group(
    State(backend): State<Arc<MockBackend>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<u64>,
) -> ApiResult {
    backend.with_db(|db| -> ApiResult {
        let group = db
            .groups
            .iter()
            .find(|g| g.id == id)
            .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Grupo não encontrado"))?;
        if group.criador_id != user_id {
            return Err(fail(
                StatusCode::FORBIDDEN,
                "Apenas o criador pode excluir o grupo",
            ));
        }
        db.groups.retain(|g| g.id != id);
        db.messages.retain(|m| m.grupo_id != id);
        Ok(Json(json!({ "message": "Grupo excluído" })))
    })
}

async fn participants(
    State(backend): State<Arc<MockBackend>>,
    AuthUser(_): AuthUser,
    Path(id): Path<u64>,
) -> ApiResult {
    backend.with_db(|db| -> ApiResult {
        let group = db
            .groups
            .iter()
            .find(|g| g.id == id)
            .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Grupo não encontrado"))?;
        Ok(Json(json!({ "participantes": db.participants_json(group) })))
    })
}

// Messages

fn member_group(db: &Db, id: u64, user_id: u64) -> Result<(), ApiError> {
    let group = db
        .groups
        .iter()
        .find(|g| g.id == id)
        .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Grupo não encontrado"))?;
    if !group.is_member(user_id) {
        return Err(fail(
            StatusCode::FORBIDDEN,
            "Você precisa ser membro do grupo",
        ));
    }
    Ok(())
}

async fn list_messages(
    State(backend): State<Arc<MockBackend>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<u64>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    let (page, limit) = page_params(&params, 50);

    backend.with_db(|db| -> ApiResult {
        member_group(db, id, user_id)?;
        let messages: Vec<MessageRow> = db
            .messages
            .iter()
            .filter(|m| m.grupo_id == id)
            .cloned()
            .collect();
        let (slice, paginacao) = paginate(&messages, page, limit);
        let mensagens: Vec<Value> = slice.iter().map(|m| db.message_json(m)).collect();
        Ok(Json(json!({ "mensagens": mensagens, "paginacao": paginacao })))
    })
}

async fn send_message(
    State(backend): State<Arc<MockBackend>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Created {
    let conteudo = str_field(&body, "conteudo").unwrap_or_default().trim().to_string();
    if conteudo.is_empty() || conteudo.chars().count() > 1000 {
        return Err(fail(StatusCode::BAD_REQUEST, "Mensagem inválida"));
    }

    backend.with_db(|db| -> Created {
        member_group(db, id, user_id)?;
        let message = MessageRow {
            id: db.next_id(),
            grupo_id: id,
            usuario_id: user_id,
            conteudo,
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        let body = json!({ "mensagem": db.message_json(&message) });
        db.messages.push(message);
        db.notify_members(id, user_id, "nova_mensagem", "Nova mensagem");
        Ok((StatusCode::CREATED, Json(body)))
    })
}

async fn latest_messages(
    State(backend): State<Arc<MockBackend>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<u64>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    let (_, limit) = page_params(&params, 10);

    backend.with_db(|db| -> ApiResult {
        member_group(db, id, user_id)?;
        let in_group: Vec<&MessageRow> = db.messages.iter().filter(|m| m.grupo_id == id).collect();
        let skip = in_group.len().saturating_sub(limit as usize);
        let mensagens: Vec<Value> = in_group[skip..].iter().map(|m| db.message_json(m)).collect();
        Ok(Json(json!({ "mensagens": mensagens })))
    })
}

async fn delete_message(
    State(backend): State<Arc<MockBackend>>,
    AuthUser(user_id): AuthUser,
    Path((id, mid)): Path<(u64, u64)>,
) -> ApiResult {
    backend.with_db(|db| -> ApiResult {
        let message = db
            .messages
            .iter()
            .find(|m| m.id == mid && m.grupo_id == id)
            .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Mensagem não encontrada"))?;
        if message.usuario_id != user_id {
            return Err(fail(
                StatusCode::FORBIDDEN,
                "Você só pode excluir suas próprias mensagens",
            ));
        }
        db.messages.retain(|m| m.id != mid);
        Ok(Json(json!({ "message": "Mensagem excluída" })))
    })
}

// Notifications

fn stats_json(db: &Db, user_id: u64) -> Value {
    let mine: Vec<&NotificationRow> = db
        .notifications
        .iter()
        .filter(|n| n.usuario_id == user_id)
        .collect();
    let unread = mine.iter().filter(|n| !n.lida).count();
    json!({
        "total": mine.len(),
        "totalNaoLidas": unread,
        "totalLidas": mine.len() - unread,
    })
}

fn notification_page(
    db: &Db,
    user_id: u64,
    params: &HashMap<String, String>,
    tipo: Option<&str>,
) -> Value {
    let (page, limit) = page_params(params, 20);
    let lida = params.get("lida").map(|l| l == "true");

    let mine: Vec<NotificationRow> = db
        .notifications
        .iter()
        .filter(|n| n.usuario_id == user_id)
        .filter(|n| lida.map_or(true, |l| n.lida == l))
        .filter(|n| tipo.map_or(true, |t| n.tipo == t))
        .cloned()
        .collect();
    let (slice, paginacao) = paginate(&mine, page, limit);
    let notificacoes: Vec<Value> = slice.iter().map(NotificationRow::to_json).collect();

    json!({
        "notificacoes": notificacoes,
        "paginacao": paginacao,
        "estatisticas": stats_json(db, user_id),
    })
}

async fn list_notifications(
    State(backend): State<Arc<MockBackend>>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    backend.with_db(|db| Ok(Json(notification_page(db, user_id, &params, None))))
}

async fn notifications_by_type(
    State(backend): State<Arc<MockBackend>>,
    AuthUser(user_id): AuthUser,
    Path(tipo): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    backend.with_db(|db| Ok(Json(notification_page(db, user_id, &params, Some(&tipo)))))
}

async fn notification_stats(
    State(backend): State<Arc<MockBackend>>,
    AuthUser(user_id): AuthUser,
) -> ApiResult {
    backend.with_db(|db| Ok(Json(json!({ "estatisticas": stats_json(db, user_id) }))))
}

async fn mark_read(
    State(backend): State<Arc<MockBackend>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<u64>,
) -> ApiResult {
    backend.with_db(|db| -> ApiResult {
        let notification = db
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.usuario_id == user_id)
            .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Notificação não encontrada"))?;
        notification.lida = true;
        Ok(Json(json!({ "message": "Notificação marcada como lida" })))
    })
}

async fn mark_all_read(
    State(backend): State<Arc<MockBackend>>,
    AuthUser(user_id): AuthUser,
) -> ApiResult {
    backend.with_db(|db| -> ApiResult {
        for n in db.notifications.iter_mut().filter(|n| n.usuario_id == user_id) {
            n.lida = true;
        }
        Ok(Json(json!({ "message": "Todas as notificações foram marcadas como lidas" })))
    })
}

async fn delete_notification(
    State(backend): State<Arc<MockBackend>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<u64>,
) -> ApiResult {
    backend.with_db(|db| -> ApiResult {
        let before = db.notifications.len();
        db.notifications
            .retain(|n| !(n.id == id && n.usuario_id == user_id));
        if db.notifications.len() == before {
            return Err(fail(StatusCode::NOT_FOUND, "Notificação não encontrada"));
        }
        Ok(Json(json!({ "message": "Notificação excluída" })))
    })
}

async fn clear_notifications(
    State(backend): State<Arc<MockBackend>>,
    AuthUser(user_id): AuthUser,
) -> ApiResult {
    backend.with_db(|db| -> ApiResult {
        db.notifications.retain(|n| n.usuario_id != user_id);
        Ok(Json(json!({ "message": "Notificações removidas" })))
    })
}
