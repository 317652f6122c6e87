// 电影浏览后端库
//
// 本库提供电影浏览页的筛选状态协调功能，包括：
// - 筛选条件 store 与 URL 参数的双向转换
// - 查询解析（store 与 URL 的优先级规则）
// - 搜索请求编排（加载、错误、过期结果丢弃）
// - 电影搜索 API 集成
// - API 路由

pub mod api;
pub mod config;
pub mod external;
pub mod models;
pub mod services;
