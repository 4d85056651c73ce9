use super::{DirectoryEntry, SearchQuery, SearchScope};
use crate::errors::{Result, SchulCloudError};
use crate::models::schools::entities::{LdapProvider, LdapSystem};
use crate::models::sync::entities::{LdapClass, LdapSchool, LdapUser};
use crate::models::users::entities::UserRole;

/// 目录类型相关的查询与映射
pub trait LdapStrategy: Send + Sync {
    fn provider(&self) -> LdapProvider;

    fn schools_query(&self, system: &LdapSystem) -> SearchQuery;
    fn users_query(&self, system: &LdapSystem, school: &LdapSchool) -> SearchQuery;
    fn classes_query(&self, system: &LdapSystem, school: &LdapSchool) -> SearchQuery;

    fn map_school(&self, entry: &DirectoryEntry) -> Option<LdapSchool>;
    fn map_user(&self, entry: &DirectoryEntry) -> Option<LdapUser>;
    fn map_class(&self, entry: &DirectoryEntry, school: &LdapSchool) -> Option<LdapClass>;
}

pub fn strategy_for(provider: LdapProvider) -> Result<Box<dyn LdapStrategy>> {
    match provider {
        LdapProvider::Univention => Ok(Box::new(UniventionStrategy)),
        LdapProvider::General => Err(SchulCloudError::not_implemented(
            "LDAP provider 'general' is not supported",
        )),
    }
}

const USER_ATTRIBUTES: [&str; 9] = [
    "givenName",
    "sn",
    "mailPrimaryAddress",
    "mail",
    "dn",
    "entryUUID",
    "uid",
    "objectClass",
    "memberOf",
];

/// UCS@school
pub struct UniventionStrategy;

impl UniventionStrategy {
    fn role_of(entry: &DirectoryEntry) -> Option<UserRole> {
        let classes = entry.all("objectClass");
        let has = |name: &str| classes.iter().any(|c| c == name);

        if has("ucsschoolAdministrator") {
            Some(UserRole::Administrator)
        } else if has("ucsschoolTeacher") {
            Some(UserRole::Teacher)
        } else if has("ucsschoolStudent") {
            Some(UserRole::Student)
        } else {
            None
        }
    }
}

impl LdapStrategy for UniventionStrategy {
    fn provider(&self) -> LdapProvider {
        LdapProvider::Univention
    }

    fn schools_query(&self, system: &LdapSystem) -> SearchQuery {
        SearchQuery {
            base: system.root_path.clone(),
            scope: SearchScope::Sub,
            filter: "(&(univentionObjectType=container/ou)(!(ucsschoolRole=school:ou:no_school)))"
                .to_string(),
            attributes: Vec::new(),
        }
    }

    fn users_query(&self, system: &LdapSystem, school: &LdapSchool) -> SearchQuery {
        SearchQuery {
            base: format!("cn=users,ou={},{}", school.ldap_ou, system.root_path),
            scope: SearchScope::Sub,
            filter: "univentionObjectType=users/user".to_string(),
            attributes: USER_ATTRIBUTES.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn classes_query(&self, system: &LdapSystem, school: &LdapSchool) -> SearchQuery {
        SearchQuery {
            base: format!(
                "cn=klassen,cn=schueler,cn=groups,ou={},{}",
                school.ldap_ou, system.root_path
            ),
            scope: SearchScope::Sub,
            filter: format!("ucsschoolRole=school_class:school:{}", school.ldap_ou),
            attributes: Vec::new(),
        }
    }

    fn map_school(&self, entry: &DirectoryEntry) -> Option<LdapSchool> {
        let ldap_ou = entry.first("ou")?.to_string();
        let display_name = entry
            .first("displayName")
            .map(str::to_string)
            .unwrap_or_else(|| ldap_ou.clone());
        Some(LdapSchool {
            ldap_ou,
            display_name,
        })
    }

    fn map_user(&self, entry: &DirectoryEntry) -> Option<LdapUser> {
        let email = entry
            .first("mailPrimaryAddress")
            .or_else(|| entry.first("mail"))?;

        Some(LdapUser {
            ldap_id: entry.first("entryUUID")?.to_string(),
            ldap_dn: entry.dn.clone(),
            ldap_uid: entry.first("uid")?.to_string(),
            first_name: entry.first("givenName").unwrap_or_default().to_string(),
            last_name: entry.first("sn").unwrap_or_default().to_string(),
            email: email.to_string(),
            role: Self::role_of(entry)?,
        })
    }

    fn map_class(&self, entry: &DirectoryEntry, school: &LdapSchool) -> Option<LdapClass> {
        let cn = entry.first("cn")?;
        // 班级 cn 形如 "{ou}-5a"
        let prefix = format!("{}-", school.ldap_ou);
        let name = cn.strip_prefix(prefix.as_str()).unwrap_or(cn);

        Some(LdapClass {
            ldap_dn: entry.dn.clone(),
            name: name.to_string(),
            member_dns: entry.all("uniqueMember").to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system() -> LdapSystem {
        LdapSystem {
            id: 1,
            alias: "ucs".to_string(),
            provider: LdapProvider::Univention,
            url: "ldaps://ucs.schule.de".to_string(),
            root_path: "dc=schule,dc=de".to_string(),
            search_user: "uid=sync".to_string(),
            search_password: "secret".to_string(),
            import_url: None,
            import_user: None,
            import_password: None,
            active: true,
            last_sync_attempt: None,
            last_successful_full_sync: None,
        }
    }

    fn school() -> LdapSchool {
        LdapSchool {
            ldap_ou: "gym1".to_string(),
            display_name: "Gymnasium Eins".to_string(),
        }
    }

    #[test]
    fn test_univention_queries() {
        let strategy = UniventionStrategy;
        let system = system();

        let schools = strategy.schools_query(&system);
        assert_eq!(schools.base, "dc=schule,dc=de");
        assert_eq!(schools.scope, SearchScope::Sub);
        assert!(schools.attributes.is_empty());

        let users = strategy.users_query(&system, &school());
        assert_eq!(users.base, "cn=users,ou=gym1,dc=schule,dc=de");
        assert_eq!(users.filter, "univentionObjectType=users/user");
        assert!(users.attributes.contains(&"entryUUID".to_string()));

        let classes = strategy.classes_query(&system, &school());
        assert_eq!(
            classes.base,
            "cn=klassen,cn=schueler,cn=groups,ou=gym1,dc=schule,dc=de"
        );
        assert_eq!(classes.filter, "ucsschoolRole=school_class:school:gym1");
    }

    #[test]
    fn test_map_user_requires_role_and_email() {
        let strategy = UniventionStrategy;
        let entry = DirectoryEntry::new("uid=max,cn=users,ou=gym1,dc=schule,dc=de")
            .with_attr("entryUUID", &["0f4e-11"])
            .with_attr("uid", &["max"])
            .with_attr("givenName", &["Max"])
            .with_attr("sn", &["Mustermann"])
            .with_attr("mail", &["max@schule.de"])
            .with_attr("objectClass", &["person", "ucsschoolTeacher"]);

        let user = strategy.map_user(&entry).unwrap();
        assert_eq!(user.role, UserRole::Teacher);
        assert_eq!(user.email, "max@schule.de");
        assert_eq!(user.ldap_dn, "uid=max,cn=users,ou=gym1,dc=schule,dc=de");

        let no_role = entry.clone().with_attr("objectClass", &["person"]);
        assert!(strategy.map_user(&no_role).is_none());

        let no_mail = entry.with_attr("mail", &[]);
        assert!(strategy.map_user(&no_mail).is_none());
    }

    #[test]
    fn test_map_class_strips_school_prefix() {
        let strategy = UniventionStrategy;
        let entry = DirectoryEntry::new("cn=gym1-5a,cn=klassen,cn=schueler")
            .with_attr("cn", &["gym1-5a"])
            .with_attr("uniqueMember", &["uid=max,cn=users", "uid=lisa,cn=users"]);

        let class = strategy.map_class(&entry, &school()).unwrap();
        assert_eq!(class.name, "5a");
        assert_eq!(class.member_dns.len(), 2);
    }

    #[test]
    fn test_general_provider_is_not_supported() {
        assert!(strategy_for(LdapProvider::General).is_err());
        assert_eq!(
            strategy_for(LdapProvider::Univention).unwrap().provider(),
            LdapProvider::Univention
        );
    }
}
