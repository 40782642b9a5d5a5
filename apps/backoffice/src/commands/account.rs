//! Sign-in, registration and the role dashboard.

use anyhow::Result;

use threadline_core::entities::{CustomerForm, RegistrationForm};
use threadline_core::Ref;

use crate::cli::{LoginArgs, PasswordArgs, RegisterArgs};
use crate::context::AppContext;
use crate::render::print_json;

pub async fn login(ctx: &AppContext, args: LoginArgs) -> Result<()> {
    let user = ctx.auth().login(&args.username, &args.password).await?;
    println!("Signed in as {} ({})", user.username, user.role);
    print_dashboard(&user.role.screens().iter().map(|s| s.as_str()).collect::<Vec<_>>());
    Ok(())
}

pub async fn logout(ctx: &AppContext) -> Result<()> {
    ctx.auth().logout().await?;
    println!("Signed out");
    Ok(())
}

pub async fn register(ctx: &AppContext, args: RegisterArgs) -> Result<()> {
    let form = RegistrationForm {
        customer: CustomerForm {
            full_name: args.full_name,
            date_of_birth: args.date_of_birth,
            email: args.email,
            nic_no: args.nic,
            mobile_number: args.mobile,
            address: args.address,
            zip_code: args.zip_code,
            province: args.province.map(Ref::new),
            ..CustomerForm::default()
        },
        username: args.username,
        password: args.password,
        confirm_password: args.confirm_password,
    };
    let message = ctx.auth().register(form).await?;
    println!("{}", message.unwrap_or_else(|| "Registration complete".to_string()));
    println!("Sign in with `threadline login` to start shopping");
    Ok(())
}

pub async fn change_password(ctx: &AppContext, args: PasswordArgs) -> Result<()> {
    let message = ctx
        .auth()
        .change_password(&args.current, &args.new, &args.confirm)
        .await?;
    println!("{}", message.unwrap_or_else(|| "Password changed".to_string()));
    Ok(())
}

pub async fn whoami(ctx: &AppContext) -> Result<()> {
    let user = ctx.session().require_user().await?;
    if ctx.json {
        return print_json(&user);
    }
    println!("{} ({})", user.username, user.role);
    if let Some(id) = user.customer_id {
        println!("Customer #{id}");
    }
    print_dashboard(&user.role.screens().iter().map(|s| s.as_str()).collect::<Vec<_>>());
    Ok(())
}

fn print_dashboard(screens: &[&str]) {
    println!("Dashboard: {}", screens.join(", "));
}
