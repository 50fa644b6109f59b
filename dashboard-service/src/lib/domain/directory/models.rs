/// Directory integration settings relevant to role resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryConfig {
    /// Members of any of these groups are promoted to admin.
    pub admin_groups: Vec<String>,
    /// Group every directory user must belong to, if any.
    pub required_group: Option<String>,
}

impl DirectoryConfig {
    pub fn is_admin_group(&self, group: &str) -> bool {
        self.admin_groups.iter().any(|admin| admin == group)
    }
}
