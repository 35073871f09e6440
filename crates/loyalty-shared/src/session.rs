//! 会话存储模块
//!
//! 基于并发哈希表的内存会话存储：以会话令牌为键，O(1) 查找，
//! 读取时惰性清理过期项。进程重启后会话失效，用户重新登录即可。

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

/// 单个会话记录
#[derive(Debug, Clone)]
struct Session {
    login: String,
    expires_at: DateTime<Utc>,
}

/// 并发会话存储
///
/// 令牌 -> 用户身份的映射。读多写少：每个请求一次 resolve，
/// 只有注册/登录产生写入，DashMap 的分段锁保证并发读不互相阻塞。
pub struct SessionStore {
    sessions: DashMap<String, Session>,
    ttl: Duration,
}

impl SessionStore {
    /// 创建会话存储
    ///
    /// `ttl_seconds` 为会话有效期，签发时刻起算。
    pub fn new(ttl_seconds: i64) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl: Duration::seconds(ttl_seconds),
        }
    }

    /// 为用户签发新会话，返回会话令牌
    ///
    /// 令牌为 32 字节随机数的 URL-safe base64 编码。
    /// 签发时顺带清理已过期的会话，避免存储无限增长。
    pub fn issue(&self, login: &str) -> String {
        let now = Utc::now();
        self.sessions.retain(|_, s| s.expires_at > now);

        let token = generate_token();
        self.sessions.insert(
            token.clone(),
            Session {
                login: login.to_string(),
                expires_at: now + self.ttl,
            },
        );
        token
    }

    /// 根据令牌解析用户身份
    ///
    /// 过期的会话在读取时被移除并视为不存在。
    pub fn resolve(&self, token: &str) -> Option<String> {
        let expired = match self.sessions.get(token) {
            Some(session) => {
                if session.expires_at > Utc::now() {
                    return Some(session.login.clone());
                }
                true
            }
            None => false,
        };
        if expired {
            self.sessions.remove(token);
        }
        None
    }

    /// 会话有效期（秒），供 Cookie Max-Age 等调用方使用
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// 当前存活会话数（含尚未被清理的过期项）
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// 生成 32 字节随机令牌并编码为 URL-safe base64
fn generate_token() -> String {
    use base64::Engine as _;
    use rand::RngCore;

    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_resolve() {
        let store = SessionStore::new(3600);
        let token = store.issue("alice");

        assert_eq!(store.resolve(&token), Some("alice".to_string()));
        assert_eq!(store.resolve("no-such-token"), None);
    }

    #[test]
    fn test_tokens_are_unique() {
        let store = SessionStore::new(3600);
        let t1 = store.issue("alice");
        let t2 = store.issue("alice");
        assert_ne!(t1, t2);
    }

    #[test]
    fn test_expired_session_removed_on_read() {
        // ttl 为负，签发即过期
        let store = SessionStore::new(-1);
        let token = store.issue("alice");

        assert_eq!(store.resolve(&token), None);
        // 读取后过期项应已被移除
        assert!(store.is_empty());
    }

    #[test]
    fn test_issue_sweeps_expired() {
        let store = SessionStore::new(-1);
        store.issue("alice");
        store.issue("bob");
        // 第二次签发时第一条过期记录已被清理，存储中只剩最新一条
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_concurrent_resolve() {
        use std::sync::Arc;

        let store = Arc::new(SessionStore::new(3600));
        let token = store.issue("alice");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                let token = token.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        assert_eq!(store.resolve(&token), Some("alice".to_string()));
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
    }
}
