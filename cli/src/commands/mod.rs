mod food;
mod helpers;
mod ingredient;
mod table;

pub(crate) use food::{
    cmd_food_add, cmd_food_delete, cmd_food_list, cmd_food_recipe, cmd_food_rename,
    cmd_food_show, cmd_seed,
};
pub(crate) use ingredient::{
    cmd_ingredient_add, cmd_ingredient_delete, cmd_ingredient_list, cmd_ingredient_rename,
};
pub(crate) use table::{cmd_amount, cmd_table, cmd_unuse, cmd_use};
