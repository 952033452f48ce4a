use std::collections::BTreeSet;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    View,
    Create,
    Update,
    Comment,
    Assign,
    Escalate,
    Close,
    Delete,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::View => "view",
            Permission::Create => "create",
            Permission::Update => "update",
            Permission::Comment => "comment",
            Permission::Assign => "assign",
            Permission::Escalate => "escalate",
            Permission::Close => "close",
            Permission::Delete => "delete",
        }
    }
}

/// War room roles, declared in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    IncidentCommanders,
    OncallEngineers,
    Developers,
    Observers,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::IncidentCommanders,
        Role::OncallEngineers,
        Role::Developers,
        Role::Observers,
    ];

    pub fn group_name(&self) -> &'static str {
        match self {
            Role::IncidentCommanders => "incident-commanders",
            Role::OncallEngineers => "oncall-engineers",
            Role::Developers => "developers",
            Role::Observers => "observers",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::IncidentCommanders => "Incident Commander",
            Role::OncallEngineers => "On-Call Engineer",
            Role::Developers => "Developer",
            Role::Observers => "Observer",
        }
    }

    pub fn from_group(group: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.group_name() == group)
    }

    pub fn permissions(&self) -> &'static [Permission] {
        use Permission::*;
        match self {
            Role::IncidentCommanders => &[Create, Close, Escalate, Assign, Delete],
            Role::OncallEngineers => &[Create, Update, Comment],
            Role::Developers => &[View, Comment],
            Role::Observers => &[View],
        }
    }
}

/// Granted to users outside every war room group.
const UNRESTRICTED: [Permission; 5] = [
    Permission::View,
    Permission::Create,
    Permission::Update,
    Permission::Delete,
    Permission::Comment,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessProfile {
    pub account_id: String,
    pub role: Option<Role>,
    pub role_label: Option<&'static str>,
    pub permissions: Vec<Permission>,
}

impl AccessProfile {
    pub fn from_groups(account_id: String, groups: &[String]) -> Self {
        let role = primary_role(groups);
        Self {
            account_id,
            role,
            role_label: role.map(|r| r.label()),
            permissions: permissions_for(groups).into_iter().collect(),
        }
    }
}

pub fn permissions_for(groups: &[String]) -> BTreeSet<Permission> {
    let roles: Vec<Role> = groups.iter().filter_map(|g| Role::from_group(g)).collect();

    let mut granted: BTreeSet<Permission> = if roles.is_empty() {
        UNRESTRICTED.into_iter().collect()
    } else {
        roles
            .iter()
            .flat_map(|role| role.permissions().iter().copied())
            .collect()
    };
    granted.insert(Permission::View);
    granted
}

pub fn primary_role(groups: &[String]) -> Option<Role> {
    Role::ALL
        .into_iter()
        .find(|role| groups.iter().any(|g| g == role.group_name()))
}
