mod accounts;
mod blog;
mod shop;
