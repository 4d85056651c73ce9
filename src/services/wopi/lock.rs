//! WOPI 锁状态转换
//!
//! 判定只依赖当前锁与请求，持久化由调用方以 compare-and-set 完成。

/// 客户端请求的锁操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockRequest<'a> {
    Lock(&'a str),
    /// 带 X-WOPI-OldLock 的 LOCK：先解旧锁再加新锁
    Relock { old: &'a str, new: &'a str },
    Refresh(&'a str),
    Unlock(&'a str),
}

/// 判定结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockDecision {
    /// 写入新的锁值，None 表示解锁
    Set(Option<String>),
    /// 锁不匹配，附带当前锁（未加锁时为 None）
    Conflict(Option<String>),
}

pub fn decide(current: Option<&str>, request: &LockRequest<'_>) -> LockDecision {
    let conflict = || LockDecision::Conflict(current.map(str::to_string));
    match *request {
        LockRequest::Lock(lock) => match current {
            None => LockDecision::Set(Some(lock.to_string())),
            Some(existing) if existing == lock => LockDecision::Set(Some(lock.to_string())),
            Some(_) => conflict(),
        },
        LockRequest::Relock { old, new } => match current {
            Some(existing) if existing == old => LockDecision::Set(Some(new.to_string())),
            _ => conflict(),
        },
        LockRequest::Refresh(lock) => match current {
            Some(existing) if existing == lock => LockDecision::Set(Some(lock.to_string())),
            _ => conflict(),
        },
        LockRequest::Unlock(lock) => match current {
            Some(existing) if existing == lock => LockDecision::Set(None),
            _ => conflict(),
        },
    }
}

/// PutFile 是否可写：锁必须一致，未加锁的文件只有内容为空时才可直接写入
pub fn can_put(current: Option<&str>, lock: Option<&str>, current_size: i64) -> bool {
    match (current, lock) {
        (None, _) => current_size == 0,
        (Some(existing), Some(lock)) => existing == lock,
        (Some(_), None) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_unlocked_file() {
        assert_eq!(
            decide(None, &LockRequest::Lock("a")),
            LockDecision::Set(Some("a".to_string()))
        );
        assert_eq!(
            decide(Some("a"), &LockRequest::Lock("a")),
            LockDecision::Set(Some("a".to_string()))
        );
        assert_eq!(
            decide(Some("a"), &LockRequest::Lock("b")),
            LockDecision::Conflict(Some("a".to_string()))
        );
    }

    #[test]
    fn test_relock_requires_old_lock() {
        let relock = LockRequest::Relock { old: "a", new: "b" };
        assert_eq!(
            decide(Some("a"), &relock),
            LockDecision::Set(Some("b".to_string()))
        );
        assert_eq!(decide(None, &relock), LockDecision::Conflict(None));
        assert_eq!(
            decide(Some("c"), &relock),
            LockDecision::Conflict(Some("c".to_string()))
        );
    }

    #[test]
    fn test_refresh_and_unlock() {
        assert_eq!(decide(None, &LockRequest::Refresh("a")), LockDecision::Conflict(None));
        assert_eq!(decide(Some("a"), &LockRequest::Unlock("a")), LockDecision::Set(None));
        assert_eq!(
            decide(Some("a"), &LockRequest::Unlock("b")),
            LockDecision::Conflict(Some("a".to_string()))
        );
    }

    #[test]
    fn test_put_rules() {
        assert!(can_put(None, None, 0));
        assert!(!can_put(None, Some("a"), 10));
        assert!(can_put(Some("a"), Some("a"), 10));
        assert!(!can_put(Some("a"), Some("b"), 0));
        assert!(!can_put(Some("a"), None, 0));
    }
}
