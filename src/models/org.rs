use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Department {
    pub id: i32,
    pub name_ar: String,
    pub name_la: Option<String>,
    pub short_name: Option<String>,
    pub head_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Team {
    pub id: i32,
    pub name: String,
    pub short_name: Option<String>,
    pub keywords: Option<String>,
    pub description: Option<String>,
    pub department_id: i32,
}
