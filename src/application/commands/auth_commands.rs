//! Auth Commands - 登录与建档写操作

/// 外部身份令牌登录命令
///
/// 令牌校验通过而本地无此用户时即时建档（JIT provisioning）。
#[derive(Debug, Clone)]
pub struct LoginWithIdentityToken {
    pub identity_token: String,
}

/// 邮箱口令登录命令
#[derive(Debug, Clone)]
pub struct LoginWithPassword {
    pub email: String,
    pub password: String,
}
