/// What a provider knows about the owner of an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteIdentity {
    pub provider: String,
    pub uid: String,
    pub name: String,
    pub email: Option<String>,
}
