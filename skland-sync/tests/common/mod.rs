//! Scripted upstream doubles shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use skland_api::models::{Award, parse_player_info};
use skland_api::{Credential, PlayerStatus, SignInResult, SklandError};
use skland_sync::coordinator::{AccountCoordinator, AccountIdentity, AuthApi, PlayerApi};
use skland_sync::credentials::CredentialStore;

pub const UID: &str = "12345678";
pub const NICKNAME: &str = "Doctor";

pub fn player_status(uid: &str, sanity: i64) -> PlayerStatus {
    parse_player_info(
        &json!({"code": 0, "data": {
            "status": {
                "uid": uid, "name": NICKNAME, "level": 120,
                "ap": {"current": sanity, "max": 135},
                "charCnt": 300
            },
            "building": {
                "labor": {"value": 80, "maxValue": 200, "lastUpdateTime": 0, "remainSecs": 0},
                "meeting": {"clue": {"own": 2, "received": 0, "board": ["RHINE", "URSUS"]}}
            }
        }}),
        Utc::now(),
    )
    .unwrap()
}

pub fn unauthorized() -> SklandError {
    SklandError::Unauthorized("用户未登录".into())
}

/// Player endpoints answering from queues; an empty fetch queue succeeds.
pub struct ScriptedPlayer {
    pub uid: String,
    pub fetches: Mutex<VecDeque<skland_api::Result<PlayerStatus>>>,
    pub signs: Mutex<VecDeque<skland_api::Result<SignInResult>>>,
    pub fetch_count: Mutex<usize>,
    pub credential: Mutex<Arc<Credential>>,
}

impl ScriptedPlayer {
    pub fn new(uid: &str) -> Self {
        Self {
            uid: uid.to_string(),
            fetches: Mutex::new(VecDeque::new()),
            signs: Mutex::new(VecDeque::new()),
            fetch_count: Mutex::new(0),
            credential: Mutex::new(Arc::new(Credential::new("cred-0", "token-0"))),
        }
    }

    pub fn fetch(self, result: skland_api::Result<PlayerStatus>) -> Self {
        self.fetches.lock().unwrap().push_back(result);
        self
    }

    pub fn sign(self, result: skland_api::Result<SignInResult>) -> Self {
        self.signs.lock().unwrap().push_back(result);
        self
    }
}

#[async_trait]
impl PlayerApi for ScriptedPlayer {
    async fn fetch_player_info(&self, uid: &str) -> skland_api::Result<PlayerStatus> {
        *self.fetch_count.lock().unwrap() += 1;
        let next = self.fetches.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(player_status(uid, 100)))
    }

    async fn sign(&self, _uid: &str, _channel: &str) -> skland_api::Result<SignInResult> {
        let next = self.signs.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(SignInResult::already_signed()))
    }

    fn credential(&self) -> Arc<Credential> {
        self.credential.lock().unwrap().clone()
    }

    fn replace_credential(&self, credential: Credential) {
        *self.credential.lock().unwrap() = Arc::new(credential);
    }
}

/// Auth endpoints answering from queues; an empty queue fails.
#[derive(Default)]
pub struct ScriptedAuth {
    pub refreshes: Mutex<VecDeque<skland_api::Result<String>>>,
    pub authentications: Mutex<VecDeque<skland_api::Result<Credential>>>,
    pub calls: Mutex<Vec<String>>,
}

impl ScriptedAuth {
    pub fn refresh(self, result: skland_api::Result<String>) -> Self {
        self.refreshes.lock().unwrap().push_back(result);
        self
    }

    pub fn authenticate(self, result: skland_api::Result<Credential>) -> Self {
        self.authentications.lock().unwrap().push_back(result);
        self
    }
}

#[async_trait]
impl AuthApi for ScriptedAuth {
    async fn refresh_token(&self, cred: &str) -> skland_api::Result<String> {
        self.calls.lock().unwrap().push(format!("refresh:{cred}"));
        let next = self.refreshes.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(SklandError::Auth("refresh rejected".into())))
    }

    async fn authenticate(&self, user_token: &str) -> skland_api::Result<Credential> {
        self.calls.lock().unwrap().push(format!("authenticate:{user_token}"));
        let next = self.authentications.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(SklandError::Auth("token rejected".into())))
    }
}

pub fn awards() -> Vec<Award> {
    vec![Award {
        name: "龙门币".into(),
        count: 500,
    }]
}

pub fn coordinator(
    uid: &str,
    player: Arc<ScriptedPlayer>,
    auth: Arc<ScriptedAuth>,
    store: Arc<dyn CredentialStore>,
) -> Arc<AccountCoordinator> {
    Arc::new(AccountCoordinator::new(
        AccountIdentity {
            uid: uid.to_string(),
            nickname: NICKNAME.to_string(),
            channel_master_id: "1".to_string(),
        },
        Some("user-token".to_string()),
        player,
        auth,
        store,
    ))
}
