//! Creates the `users` auth collection that owns sessions.

use stint_core::migration::{MigrationError, SchemaMigration};
use stint_shared::MigrationId;

/// Step identifier.
pub const ID: MigrationId = MigrationId::new(1_769_902_000);

/// Step name.
pub const NAME: &str = "init_users_collection";

/// Builds the step.
///
/// # Errors
///
/// Returns an error if the collection document is invalid.
pub fn migration() -> Result<SchemaMigration, MigrationError> {
    SchemaMigration::import(ID, NAME, COLLECTIONS, false)
}

const COLLECTIONS: &str = r#"[
    {
        "id": "_pb_users_auth_",
        "name": "users",
        "type": "auth",
        "system": true,
        "listRule": "id = @request.auth.id",
        "viewRule": "id = @request.auth.id",
        "createRule": "",
        "updateRule": "id = @request.auth.id",
        "deleteRule": "id = @request.auth.id",
        "authRule": "",
        "manageRule": null,
        "passwordAuth": {
            "enabled": true,
            "identityFields": ["email"]
        },
        "fields": [
            {
                "id": "text3208210256",
                "name": "id",
                "type": "text",
                "system": true,
                "required": true,
                "primaryKey": true,
                "min": 15,
                "max": 15,
                "pattern": "^[a-z0-9]+$",
                "autogeneratePattern": "[a-z0-9]{15}"
            },
            {
                "id": "password901924565",
                "name": "password",
                "type": "password",
                "system": true,
                "hidden": true,
                "required": true,
                "min": 8,
                "max": 0,
                "pattern": "",
                "cost": 0
            },
            {
                "id": "text2504183744",
                "name": "tokenKey",
                "type": "text",
                "system": true,
                "hidden": true,
                "required": true,
                "min": 30,
                "max": 60,
                "pattern": "",
                "autogeneratePattern": "[a-zA-Z0-9]{50}"
            },
            {
                "id": "email3885137012",
                "name": "email",
                "type": "email",
                "system": true,
                "required": true,
                "exceptDomains": [],
                "onlyDomains": []
            },
            {
                "id": "bool1547992806",
                "name": "emailVisibility",
                "type": "bool",
                "system": true
            },
            {
                "id": "bool256245529",
                "name": "verified",
                "type": "bool",
                "system": true
            },
            {
                "id": "text1579384326",
                "name": "name",
                "type": "text",
                "min": 0,
                "max": 255,
                "pattern": "",
                "autogeneratePattern": ""
            },
            {
                "id": "autodate2990389176",
                "name": "created",
                "type": "autodate",
                "onCreate": true,
                "onUpdate": false
            },
            {
                "id": "autodate3332085495",
                "name": "updated",
                "type": "autodate",
                "onCreate": true,
                "onUpdate": true
            }
        ],
        "indexes": [
            "CREATE UNIQUE INDEX `idx_tokenKey__pb_users_auth_` ON `users` (`tokenKey`)",
            "CREATE UNIQUE INDEX `idx_email__pb_users_auth_` ON `users` (`email`) WHERE `email` != ''"
        ]
    }
]"#;
