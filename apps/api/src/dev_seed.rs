use ems_core::AppResult;
use ems_domain::{Permission, PermissionCode, PermissionId, PermissionSet, Role, RoleId};
use ems_infrastructure::InMemoryPermissionStore;
use tracing::info;

const DEV_SEED_PERMISSIONS: &[(&str, &str)] = &[
    ("Employees", "employees.profile.view"),
    ("Employees", "employees.profile.create"),
    ("Employees", "employees.profile.edit"),
    ("Employees", "employees.profile.delete"),
    ("Projects", "projects.board.view"),
    ("Projects", "projects.board.create"),
    ("Projects", "projects.board.edit"),
    ("Tasks", "tasks.board.view"),
    ("Tasks", "tasks.board.create"),
    ("Tasks", "tasks.board.edit"),
    ("Reports", "reports.dashboard.view"),
    ("Reports", "reports.dashboard.export"),
    ("IT Asset Management", "it_assets.assets.view"),
    ("IT Asset Management", "it_assets.assets.create"),
    ("IT Asset Management", "it_assets.assignments.view"),
    ("IT Asset Management", "it_assets.tickets.view"),
    ("IT Asset Management", "it_assets.tickets.resolve"),
    ("IT Asset Management", "it_assets.maintenance.schedule"),
    ("IT Asset Management", "it_assets.inventory.view"),
    ("Settings", "settings.general.edit"),
    ("Roles", "roles.permissions.edit"),
    ("Prompts", "prompts.library.view"),
    ("My Devices", "my_devices.list.view"),
];

struct SeedRole {
    role_id: &'static str,
    name: &'static str,
    description: &'static str,
    grants: fn(&str) -> bool,
}

const DEV_SEED_ROLES: &[SeedRole] = &[
    SeedRole {
        role_id: "1",
        name: "Super Admin",
        description: "Full access to every module",
        grants: |_| true,
    },
    SeedRole {
        role_id: "2",
        name: "Admin",
        description: "Administers people and projects",
        grants: |code| !code.starts_with("roles."),
    },
    SeedRole {
        role_id: "3",
        name: "QA",
        description: "Quality assurance team",
        grants: |code| code.ends_with(".view"),
    },
    SeedRole {
        role_id: "4",
        name: "HR Manager",
        description: "",
        grants: |code| code.starts_with("employees."),
    },
];

pub async fn seed_permission_store(store: &InMemoryPermissionStore) -> AppResult<()> {
    for seed in DEV_SEED_ROLES {
        let role = Role::new(
            RoleId::new(seed.role_id)?,
            seed.name,
            Some(seed.description.to_owned()),
        )?;
        let permissions = DEV_SEED_PERMISSIONS
            .iter()
            .enumerate()
            .map(|(index, (module, code))| {
                Permission::new(
                    PermissionId::new(format!("perm-{:02}", index + 1))?,
                    *module,
                    PermissionCode::new(*code)?,
                    (seed.grants)(*code),
                )
            })
            .collect::<AppResult<Vec<_>>>()?;

        store.seed_role(role, PermissionSet::new(permissions)?).await;
    }

    info!(
        roles = DEV_SEED_ROLES.len(),
        permissions = DEV_SEED_PERMISSIONS.len(),
        "seeded in-memory permission store"
    );
    Ok(())
}
